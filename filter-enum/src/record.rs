//! Decoding of `FILTER_AGGREGATE_STANDARD_INFORMATION` chains.
//!
//! Each entry starts with a `NextEntryOffset` / `Flags` header followed by a
//! union at a fixed offset holding either the minifilter or the legacy filter
//! variant. Every offset in an entry (next entry, name, altitude) is relative
//! to the start of that entry.

use serde::Serialize;

use crate::error::{FilterError, Result};

pub const FLTFL_ASI_IS_MINIFILTER: u32 = 0x0000_0001;
pub const FLTFL_ASI_IS_LEGACYFILTER: u32 = 0x0000_0002;

// Offset of the shape-specific union inside an aggregate entry.
const SUBRECORD_OFFSET: usize = 8;

// Minifilter variant: Flags, FrameID, NumberOfInstances, then the text pairs.
const MINI_FRAME_ID: usize = 4;
const MINI_INSTANCES: usize = 8;
const MINI_TEXT_PAIRS: usize = 12;

// Legacy variant: Flags, then the text pairs.
const LEGACY_TEXT_PAIRS: usize = 4;

// FilterNameLength, FilterNameBufferOffset, FilterAltitudeLength, FilterAltitudeBufferOffset.
const TEXT_PAIRS_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    Minifilter,
    Legacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MinifilterDetails {
    instances: u32,
    frame_id: u32,
}

/// One filter driver as reported by the filter manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRecord {
    name: String,
    altitude: i32,
    details: Option<MinifilterDetails>,
}

impl Serialize for FilterRecord {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("FilterRecord", 5)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("altitude", &self.altitude)?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("instances", &self.instances())?;
        state.serialize_field("frame_id", &self.frame_id())?;
        state.end()
    }
}

impl FilterRecord {
    pub fn minifilter(name: impl Into<String>, altitude: i32, instances: u32, frame_id: u32) -> Self {
        FilterRecord {
            name: name.into(),
            altitude,
            details: Some(MinifilterDetails { instances, frame_id }),
        }
    }

    pub fn legacy(name: impl Into<String>, altitude: i32) -> Self {
        FilterRecord {
            name: name.into(),
            altitude,
            details: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    pub fn instances(&self) -> Option<u32> {
        self.details.map(|d| d.instances)
    }

    pub fn frame_id(&self) -> Option<u32> {
        self.details.map(|d| d.frame_id)
    }

    pub fn kind(&self) -> FilterKind {
        match self.details {
            Some(_) => FilterKind::Minifilter,
            None => FilterKind::Legacy,
        }
    }
}

/// Decodes every entry of the chain that starts at offset 0 of `view`.
pub fn decode_chain(view: &[u8]) -> Result<Vec<FilterRecord>> {
    let mut records = Vec::new();
    let mut entry = 0usize;

    loop {
        let next_entry_offset = read_u32(view, entry, 0)?;
        let flags = read_u32(view, entry, 4)?;
        let sub = SUBRECORD_OFFSET;

        let record = match flags {
            FLTFL_ASI_IS_MINIFILTER => {
                let frame_id = read_u32(view, entry, sub + MINI_FRAME_ID)?;
                let instances = read_u32(view, entry, sub + MINI_INSTANCES)?;
                let (name, altitude) = read_text_pairs(view, entry, sub + MINI_TEXT_PAIRS)?;
                FilterRecord::minifilter(name, altitude, instances, frame_id)
            }
            FLTFL_ASI_IS_LEGACYFILTER => {
                let (name, altitude) = read_text_pairs(view, entry, sub + LEGACY_TEXT_PAIRS)?;
                FilterRecord::legacy(name, altitude)
            }
            other => {
                return Err(FilterError::corrupt(
                    entry,
                    format!("invalid information type received: {:08X}", other),
                ))
            }
        };

        log::trace!(
            "decoded {:?} filter {} at altitude {} (entry offset {})",
            record.kind(),
            record.name(),
            record.altitude(),
            entry
        );
        records.push(record);

        if next_entry_offset == 0 {
            break;
        }

        entry = entry
            .checked_add(next_entry_offset as usize)
            .filter(|&next| next < view.len())
            .ok_or_else(|| {
                FilterError::corrupt(
                    entry,
                    format!("next entry offset {} points outside the buffer", next_entry_offset),
                )
            })?;
    }

    Ok(records)
}

fn read_text_pairs(view: &[u8], entry: usize, at: usize) -> Result<(String, i32)> {
    // Make sure the whole fixed part is present before reading any of it.
    field(view, entry, at, TEXT_PAIRS_SIZE)?;

    let name_length = read_u16(view, entry, at)?;
    let name_offset = read_u16(view, entry, at + 2)?;
    let altitude_length = read_u16(view, entry, at + 4)?;
    let altitude_offset = read_u16(view, entry, at + 6)?;

    let name = read_utf16(view, entry, name_offset, name_length)?;
    if name.is_empty() {
        return Err(FilterError::corrupt(entry, "filter name is empty"));
    }

    let altitude_text = read_utf16(view, entry, altitude_offset, altitude_length)?;
    let altitude = parse_altitude(&altitude_text).ok_or_else(|| {
        FilterError::corrupt(entry, format!("altitude {:?} is not an integer", altitude_text))
    })?;

    Ok((name, altitude))
}

/// Base-10 altitude: optional surrounding white space, optional sign, ASCII
/// digits only.
pub fn parse_altitude(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix(&['+', '-'][..]).unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

fn read_utf16(view: &[u8], entry: usize, offset: u16, byte_length: u16) -> Result<String> {
    let chars = usize::from(byte_length) / 2;
    let bytes = field(view, entry, usize::from(offset), chars * 2)?;

    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&units).map_err(|_| FilterError::corrupt(entry, "text is not valid UTF-16"))
}

fn read_u32(view: &[u8], entry: usize, at: usize) -> Result<u32> {
    let bytes = field(view, entry, at, 4)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_u16(view: &[u8], entry: usize, at: usize) -> Result<u16> {
    let bytes = field(view, entry, at, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

// Bounds-checked slice of `len` bytes at `entry + at`.
fn field(view: &[u8], entry: usize, at: usize, len: usize) -> Result<&[u8]> {
    entry
        .checked_add(at)
        .and_then(|start| start.checked_add(len).map(|end| (start, end)))
        .and_then(|(start, end)| view.get(start..end))
        .ok_or_else(|| {
            FilterError::corrupt(
                entry,
                format!("{} bytes at +{} exceed the {} byte buffer", len, at, view.len()),
            )
        })
}
