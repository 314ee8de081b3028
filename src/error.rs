//! Error types for the record store.

use crate::types::PageId;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur in the record store
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the backing sink (short read/write, stat, close)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a store file (bad magic, short header, bad page size)
    #[error("Invalid database file: {0}")]
    InvalidFormat(String),

    /// The file looks like a store file but its contents are inconsistent
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Page does not have enough space for the record
    #[error("Page {page_id} is full, need {needed} bytes but only {available} available")]
    OutOfSpace {
        page_id: PageId,
        needed: usize,
        available: usize,
    },

    /// Record can never fit in a page of this store
    #[error("Record too large: {size} bytes (max: {max})")]
    RecordTooLarge { size: usize, max: usize },

    /// Requested page lies beyond the end of the file
    #[error("Page {0} not found")]
    PageNotFound(PageId),

    /// Configuration rejected before touching the file
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cursor has no more records
    #[error("Cursor exhausted")]
    CursorExhausted,

    /// A failure followed by a failed cleanup step
    #[error("{primary} (cleanup also failed: {cleanup})")]
    WithCleanup {
        primary: Box<StorageError>,
        cleanup: Box<StorageError>,
    },
}

impl StorageError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Attach the outcome of a cleanup step to this error.
    ///
    /// A successful cleanup leaves the error unchanged.
    pub fn with_cleanup<E: Into<StorageError>>(self, cleanup: std::result::Result<(), E>) -> Self {
        match cleanup {
            Ok(()) => self,
            Err(err) => Self::WithCleanup {
                primary: Box::new(self),
                cleanup: Box::new(err.into()),
            },
        }
    }

    /// Whether this is a recoverable out-of-space condition
    pub fn is_out_of_space(&self) -> bool {
        matches!(self, Self::OutOfSpace { .. })
    }
}

/// Merge the results of an operation and the cleanup that always follows it.
pub fn combine(primary: Result<()>, cleanup: Result<()>) -> Result<()> {
    match primary {
        Ok(()) => cleanup,
        Err(err) => Err(err.with_cleanup(cleanup)),
    }
}
