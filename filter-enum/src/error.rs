/// Every way a filter enumeration can go wrong.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("desired buffer size {requested} should be greater than zero and not exceed {max}")]
    InvalidSize { requested: usize, max: usize },

    #[error("unable to allocate or extend the buffer to {requested} bytes")]
    AllocationFailed { requested: usize },

    #[error("buffer is already released")]
    UseAfterRelease,

    #[error("corrupt filter record at offset {offset}: {reason}")]
    CorruptRecord { offset: usize, reason: String },

    #[error("unable to get the filter driver information: 0x{status:08X}")]
    EnumerationFailed { status: u32 },
}

impl FilterError {
    pub(crate) fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        FilterError::CorruptRecord {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
