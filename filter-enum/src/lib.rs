//! Enumeration of the file-system filter drivers loaded on a Windows host,
//! through the filter manager's `FilterFindFirst` / `FilterFindNext` cursor.

pub mod buffer;
pub mod enumerator;
pub mod error;
pub mod fltmgr;
#[cfg(windows)]
pub mod native;
pub mod record;

pub use buffer::GrowableBuffer;
pub use enumerator::{enumerate, enumerate_with_capacity, DEFAULT_INITIAL_BUFFER};
#[cfg(windows)]
pub use enumerator::{enumerate_filters, enumerate_filters_with_capacity};
pub use error::{FilterError, Result};
pub use fltmgr::{FilterManager, FindStatus, InformationClass};
#[cfg(windows)]
pub use native::FltLib;
pub use record::{decode_chain, FilterKind, FilterRecord};
