use std::ptr;

use winapi::shared::minwindef::{DWORD, LPDWORD, LPVOID};
use winapi::shared::ntdef::HRESULT;
use winapi::um::handleapi::INVALID_HANDLE_VALUE;
use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};
use winapi::um::winnt::HANDLE;

use crate::fltmgr::{FilterManager, FindStatus, InformationClass};

#[link(name = "fltlib")]
extern "system" {
    fn FilterFindFirst(
        information_class: DWORD,
        buffer: LPVOID,
        buffer_size: DWORD,
        bytes_returned: LPDWORD,
        filter_find: *mut HANDLE,
    ) -> HRESULT;

    fn FilterFindNext(
        filter_find: HANDLE,
        information_class: DWORD,
        buffer: LPVOID,
        buffer_size: DWORD,
        bytes_returned: LPDWORD,
    ) -> HRESULT;

    fn FilterFindClose(filter_find: HANDLE) -> HRESULT;
}

pub fn page_size() -> usize {
    let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
    unsafe { GetSystemInfo(&mut info) };
    info.dwPageSize as usize
}

/// Find handle returned by `FilterFindFirst`.
#[derive(Debug)]
pub struct FindHandle(HANDLE);

/// The real filter manager, reached through fltlib.dll.
#[derive(Debug, Default)]
pub struct FltLib;

fn buffer_size(buffer: &[u8]) -> DWORD {
    buffer.len().min(DWORD::MAX as usize) as DWORD
}

impl FilterManager for FltLib {
    type Session = FindHandle;

    fn find_first(
        &mut self,
        class: InformationClass,
        buffer: &mut [u8],
    ) -> (FindStatus, Option<FindHandle>) {
        let mut bytes_returned: DWORD = 0;
        let mut handle: HANDLE = ptr::null_mut();

        let hr = unsafe {
            FilterFindFirst(
                class as DWORD,
                buffer.as_mut_ptr() as LPVOID,
                buffer_size(buffer),
                &mut bytes_returned,
                &mut handle,
            )
        };

        let session = if handle.is_null() || handle == INVALID_HANDLE_VALUE {
            None
        } else {
            Some(FindHandle(handle))
        };

        (FindStatus::from_hresult(hr as u32, bytes_returned), session)
    }

    fn find_next(
        &mut self,
        session: &FindHandle,
        class: InformationClass,
        buffer: &mut [u8],
    ) -> FindStatus {
        let mut bytes_returned: DWORD = 0;

        let hr = unsafe {
            FilterFindNext(
                session.0,
                class as DWORD,
                buffer.as_mut_ptr() as LPVOID,
                buffer_size(buffer),
                &mut bytes_returned,
            )
        };

        FindStatus::from_hresult(hr as u32, bytes_returned)
    }

    fn close(&mut self, session: FindHandle) {
        let hr = unsafe { FilterFindClose(session.0) };
        if hr != 0 {
            log::warn!("FilterFindClose failed: 0x{:08X}", hr as u32);
        }
    }
}
