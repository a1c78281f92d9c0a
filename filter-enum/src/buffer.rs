use crate::error::{FilterError, Result};

// Hard ceiling for any buffer, whatever size the filter manager asks for.
const MAX_BUFFER_SIZE: usize = 5 * 1024 * 1024;

#[cfg(not(windows))]
const FALLBACK_PAGE_SIZE: usize = 4096;

/// Memory page size of the host.
#[cfg(windows)]
pub fn page_size() -> usize {
    crate::native::page_size()
}

#[cfg(not(windows))]
pub fn page_size() -> usize {
    FALLBACK_PAGE_SIZE
}

/// Largest capacity a `GrowableBuffer` may reach.
pub fn max_size() -> usize {
    MAX_BUFFER_SIZE.max(page_size())
}

/// A zeroed byte region that only ever grows, handed to the filter manager
/// as the output buffer of `FilterFindFirst` / `FilterFindNext`.
#[derive(Debug)]
pub struct GrowableBuffer {
    bytes: Vec<u8>,
    released: bool,
}

impl GrowableBuffer {
    pub fn new(initial_size: usize) -> Result<Self> {
        let mut buffer = GrowableBuffer {
            bytes: Vec::new(),
            released: false,
        };
        buffer.ensure_size(initial_size)?;
        Ok(buffer)
    }

    pub fn with_page_size() -> Result<Self> {
        Self::new(page_size())
    }

    /// Grows the buffer to exactly `new_size` bytes and zeroes all of it.
    /// Does nothing when the buffer is already large enough.
    pub fn ensure_size(&mut self, new_size: usize) -> Result<()> {
        if self.released {
            return Err(FilterError::UseAfterRelease);
        }

        let max = max_size();
        if new_size == 0 || new_size > max {
            return Err(FilterError::InvalidSize {
                requested: new_size,
                max,
            });
        }

        if self.bytes.len() >= new_size {
            return Ok(());
        }

        let additional = new_size - self.bytes.len();
        if self.bytes.try_reserve_exact(additional).is_err() {
            self.bytes = Vec::new();
            return Err(FilterError::AllocationFailed {
                requested: new_size,
            });
        }

        // The whole region is re-zeroed, not only the new tail.
        self.bytes.clear();
        self.bytes.resize(new_size, 0);
        Ok(())
    }

    pub fn capacity(&self) -> Result<usize> {
        if self.released {
            return Err(FilterError::UseAfterRelease);
        }
        Ok(self.bytes.len())
    }

    pub fn raw_view(&self) -> Result<&[u8]> {
        if self.released {
            return Err(FilterError::UseAfterRelease);
        }
        Ok(&self.bytes)
    }

    pub fn raw_view_mut(&mut self) -> Result<&mut [u8]> {
        if self.released {
            return Err(FilterError::UseAfterRelease);
        }
        Ok(&mut self.bytes)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Frees the region. Safe to call any number of times.
    pub fn release(&mut self) {
        self.bytes = Vec::new();
        self.released = true;
    }
}

impl Drop for GrowableBuffer {
    fn drop(&mut self) {
        self.release();
    }
}
