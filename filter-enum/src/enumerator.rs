use crate::buffer::GrowableBuffer;
use crate::error::{FilterError, Result};
use crate::fltmgr::{FilterManager, FindStatus, InformationClass, ERROR_INVALID_HANDLE_HR};
use crate::record::{decode_chain, FilterRecord};

pub const DEFAULT_INITIAL_BUFFER: usize = 1024;

const CLASS: InformationClass = InformationClass::AggregateStandard;

/// Owns the find handle for one enumeration and closes it when dropped.
struct FindSession<'a, M: FilterManager> {
    manager: &'a mut M,
    handle: Option<M::Session>,
}

impl<'a, M: FilterManager> FindSession<'a, M> {
    fn new(manager: &'a mut M) -> Self {
        FindSession {
            manager,
            handle: None,
        }
    }

    fn find_first(&mut self, buffer: &mut [u8]) -> FindStatus {
        let (status, handle) = self.manager.find_first(CLASS, buffer);
        if let Some(handle) = handle {
            // A retried first call must not leak the handle of the earlier one.
            if let Some(previous) = self.handle.replace(handle) {
                self.manager.close(previous);
            }
            log::debug!("filter find session opened");
        }
        status
    }

    fn find_next(&mut self, buffer: &mut [u8]) -> FindStatus {
        match &self.handle {
            Some(handle) => self.manager.find_next(handle, CLASS, buffer),
            None => FindStatus::Failed(ERROR_INVALID_HANDLE_HR),
        }
    }
}

impl<M: FilterManager> Drop for FindSession<'_, M> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.manager.close(handle);
            log::debug!("filter find session closed");
        }
    }
}

// Issues `call`, and if the buffer was too small grows it to the reported
// size and issues it exactly once more.
fn negotiate<F>(buffer: &mut GrowableBuffer, mut call: F) -> Result<FindStatus>
where
    F: FnMut(&mut [u8]) -> FindStatus,
{
    let status = call(buffer.raw_view_mut()?);
    match status {
        FindStatus::InsufficientBuffer { required } => {
            log::debug!(
                "buffer of {} bytes too small, growing to {}",
                buffer.capacity()?,
                required
            );
            buffer.ensure_size(required as usize)?;
            Ok(call(buffer.raw_view_mut()?))
        }
        other => Ok(other),
    }
}

// Appends the records of a successful page. Returns false once the cursor is
// exhausted.
fn collect_page(
    status: FindStatus,
    buffer: &GrowableBuffer,
    records: &mut Vec<FilterRecord>,
) -> Result<bool> {
    match status {
        FindStatus::Ok => {
            let page = decode_chain(buffer.raw_view()?)?;
            log::debug!("decoded {} filter record(s) from page", page.len());
            records.extend(page);
            Ok(true)
        }
        FindStatus::NoMoreItems => Ok(false),
        failed => Err(FilterError::EnumerationFailed {
            status: failed.code(),
        }),
    }
}

/// Every filter currently registered with the filter manager, in the order
/// it reports them.
pub fn enumerate<M: FilterManager>(manager: &mut M) -> Result<Vec<FilterRecord>> {
    enumerate_with_capacity(manager, DEFAULT_INITIAL_BUFFER)
}

pub fn enumerate_with_capacity<M: FilterManager>(
    manager: &mut M,
    initial_size: usize,
) -> Result<Vec<FilterRecord>> {
    let mut buffer = GrowableBuffer::new(initial_size)?;
    let mut session = FindSession::new(manager);
    let mut records = Vec::new();

    let status = negotiate(&mut buffer, |view| session.find_first(view))?;
    if !collect_page(status, &buffer, &mut records)? {
        log::debug!("filter manager reported no filters");
        return Ok(records);
    }

    loop {
        let status = negotiate(&mut buffer, |view| session.find_next(view))?;
        if !collect_page(status, &buffer, &mut records)? {
            break;
        }
    }

    buffer.release();
    Ok(records)
}

/// Enumerates the filters of the running system.
#[cfg(windows)]
pub fn enumerate_filters() -> Result<Vec<FilterRecord>> {
    enumerate(&mut crate::native::FltLib)
}

#[cfg(windows)]
pub fn enumerate_filters_with_capacity(initial_size: usize) -> Result<Vec<FilterRecord>> {
    enumerate_with_capacity(&mut crate::native::FltLib, initial_size)
}
