#![allow(dead_code)]

use std::collections::VecDeque;

use mallab_filter_enum::{FilterManager, FindStatus, InformationClass};

pub enum Shape {
    Minifilter { frame_id: u32, instances: u32 },
    Legacy,
    Flag(u32),
}

pub struct Entry<'a> {
    pub shape: Shape,
    pub name: &'a str,
    pub altitude: &'a str,
}

pub fn mini<'a>(name: &'a str, altitude: &'a str, frame_id: u32, instances: u32) -> Entry<'a> {
    Entry {
        shape: Shape::Minifilter { frame_id, instances },
        name,
        altitude,
    }
}

pub fn legacy<'a>(name: &'a str, altitude: &'a str) -> Entry<'a> {
    Entry {
        shape: Shape::Legacy,
        name,
        altitude,
    }
}

fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Serialises one aggregate entry with its texts right after the fixed part.
/// Returns the bytes without padding.
pub fn entry_bytes(entry: &Entry, next_entry_offset: u32) -> Vec<u8> {
    let (flag, fixed_len) = match entry.shape {
        Shape::Minifilter { .. } => (1, 8 + 20),
        Shape::Legacy => (2, 8 + 12),
        Shape::Flag(flag) => (flag, 8 + 12),
    };
    let name = utf16(entry.name);
    let altitude = utf16(entry.altitude);
    let name_offset = fixed_len as u16;
    let altitude_offset = name_offset + name.len() as u16;

    let mut buf = Vec::new();
    put_u32(&mut buf, next_entry_offset);
    put_u32(&mut buf, flag);
    put_u32(&mut buf, flag);
    if let Shape::Minifilter { frame_id, instances } = entry.shape {
        put_u32(&mut buf, frame_id);
        put_u32(&mut buf, instances);
    }
    put_u16(&mut buf, name.len() as u16);
    put_u16(&mut buf, name_offset);
    put_u16(&mut buf, altitude.len() as u16);
    put_u16(&mut buf, altitude_offset);
    assert_eq!(buf.len(), fixed_len);

    buf.extend_from_slice(&name);
    buf.extend_from_slice(&altitude);
    buf
}

/// Lays out a chain with every entry `stride` bytes apart.
pub fn chain_with_stride(entries: &[Entry], stride: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == entries.len();
        let next = if last { 0 } else { stride as u32 };
        let mut bytes = entry_bytes(entry, next);
        assert!(bytes.len() <= stride, "entry does not fit the stride");
        if !last {
            bytes.resize(stride, 0);
        }
        out.extend_from_slice(&bytes);
    }
    out
}

/// Lays out a chain with each entry padded to an 8 byte boundary.
pub fn chain(entries: &[Entry]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let last = i + 1 == entries.len();
        let len = entry_bytes(entry, 0).len();
        let padded = (len + 7) & !7;
        let mut bytes = entry_bytes(entry, if last { 0 } else { padded as u32 });
        if !last {
            bytes.resize(padded, 0);
        }
        out.extend_from_slice(&bytes);
    }
    out
}

pub enum Reply {
    /// Writes the page when it fits, otherwise answers insufficient buffer
    /// with the page size and keeps the page for the next call.
    Page(Vec<u8>),
    /// Answers with a bare status.
    Status(FindStatus),
}

/// A filter manager that plays back a fixed script of replies.
#[derive(Default)]
pub struct ScriptedManager {
    replies: VecDeque<Reply>,
    next_handle: u32,
    pub hand_out_handle_on_failure: bool,
    pub first_calls: usize,
    pub next_calls: usize,
    pub buffer_sizes: Vec<usize>,
    pub closed: Vec<u32>,
    pub classes: Vec<InformationClass>,
}

impl ScriptedManager {
    pub fn new(replies: Vec<Reply>) -> Self {
        ScriptedManager {
            replies: replies.into(),
            next_handle: 100,
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.replies.len()
    }

    fn answer(&mut self, buffer: &mut [u8]) -> FindStatus {
        self.buffer_sizes.push(buffer.len());
        match self.replies.pop_front() {
            Some(Reply::Page(page)) => {
                if page.len() > buffer.len() {
                    let required = page.len() as u32;
                    self.replies.push_front(Reply::Page(page));
                    return FindStatus::InsufficientBuffer { required };
                }
                buffer[..page.len()].copy_from_slice(&page);
                FindStatus::Ok
            }
            Some(Reply::Status(status)) => status,
            None => FindStatus::NoMoreItems,
        }
    }
}

impl FilterManager for ScriptedManager {
    type Session = u32;

    fn find_first(
        &mut self,
        class: InformationClass,
        buffer: &mut [u8],
    ) -> (FindStatus, Option<u32>) {
        self.first_calls += 1;
        self.classes.push(class);
        let status = self.answer(buffer);
        let handle = if status == FindStatus::Ok || self.hand_out_handle_on_failure {
            self.next_handle += 1;
            Some(self.next_handle)
        } else {
            None
        };
        (status, handle)
    }

    fn find_next(&mut self, _session: &u32, class: InformationClass, buffer: &mut [u8]) -> FindStatus {
        self.next_calls += 1;
        self.classes.push(class);
        self.answer(buffer)
    }

    fn close(&mut self, session: u32) {
        self.closed.push(session);
    }
}
