// Result codes returned by the fltlib find functions.
pub const S_OK: u32 = 0;
pub const ERROR_INSUFFICIENT_BUFFER_HR: u32 = 0x8007_007A;
pub const ERROR_NO_MORE_ITEMS_HR: u32 = 0x8007_0103;
pub const ERROR_INVALID_HANDLE_HR: u32 = 0x8007_0006;

/// `FILTER_INFORMATION_CLASS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InformationClass {
    FullInformation = 0,
    AggregateBasic = 1,
    AggregateStandard = 2,
}

/// Outcome of one find call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindStatus {
    Ok,
    InsufficientBuffer { required: u32 },
    NoMoreItems,
    Failed(u32),
}

impl FindStatus {
    /// Maps a raw result code; `bytes_returned` carries the required size
    /// when the buffer was too small.
    pub fn from_hresult(hr: u32, bytes_returned: u32) -> Self {
        match hr {
            S_OK => FindStatus::Ok,
            ERROR_INSUFFICIENT_BUFFER_HR => FindStatus::InsufficientBuffer {
                required: bytes_returned,
            },
            ERROR_NO_MORE_ITEMS_HR => FindStatus::NoMoreItems,
            other => FindStatus::Failed(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            FindStatus::Ok => S_OK,
            FindStatus::InsufficientBuffer { .. } => ERROR_INSUFFICIENT_BUFFER_HR,
            FindStatus::NoMoreItems => ERROR_NO_MORE_ITEMS_HR,
            FindStatus::Failed(code) => *code,
        }
    }
}

/// The filter manager's find cursor: `FilterFindFirst`, `FilterFindNext`
/// and `FilterFindClose`.
pub trait FilterManager {
    type Session;

    /// Returns the session handle when the call produced a valid one.
    fn find_first(
        &mut self,
        class: InformationClass,
        buffer: &mut [u8],
    ) -> (FindStatus, Option<Self::Session>);

    fn find_next(
        &mut self,
        session: &Self::Session,
        class: InformationClass,
        buffer: &mut [u8],
    ) -> FindStatus;

    fn close(&mut self, session: Self::Session);
}
