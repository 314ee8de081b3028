//! Store file header.
//!
//! The first bytes of the store file identify the format and record the
//! page size. The page count is not stored; it is derived from the file size.

use crate::error::{Result, StorageError};
use crate::page::{read_u32, write_u32};
use crate::types::{is_valid_page_size, FILE_HEADER_SIZE, FILE_MAGIC, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Store file header
///
/// Layout (little-endian):
/// ```text
/// Offset  Size  Description
/// 0       4     Magic number 0x42444F47 ("GODB")
/// 4       4     Page size in bytes
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Page size in bytes
    pub page_size: u32,
}

impl FileHeader {
    /// Create a header for a new store file
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size as u32,
        }
    }

    /// Read a file header from bytes
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FILE_HEADER_SIZE {
            return Err(StorageError::invalid_format(format!(
                "header too short: {} bytes",
                bytes.len()
            )));
        }

        let magic = read_u32(bytes, 0);
        if magic != FILE_MAGIC {
            return Err(StorageError::invalid_format(format!(
                "invalid magic number {:#010x}",
                magic
            )));
        }

        let page_size = read_u32(bytes, 4);
        if !is_valid_page_size(page_size as usize) {
            return Err(StorageError::invalid_format(format!(
                "unsupported page size: {} (expected {}..={})",
                page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page_size })
    }

    /// Encode this header
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut bytes = [0u8; FILE_HEADER_SIZE];
        write_u32(&mut bytes, 0, FILE_MAGIC);
        write_u32(&mut bytes, 4, self.page_size);
        bytes
    }

    /// Page size as a length
    pub fn page_size(&self) -> usize {
        self.page_size as usize
    }
}
