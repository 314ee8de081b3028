//! Page header structure.
//!
//! The page header occupies the first bytes of each page and records how
//! many slots are in use and where the free gap begins and ends.

use crate::page::{read_u16, read_u32, write_u16, write_u32};
use crate::types::{PAGE_HEADER_SIZE, SLOT_SIZE};

/// Page header structure
///
/// Layout (24 bytes, little-endian):
/// ```text
/// Offset  Size  Description
/// 0       2     Number of slots in use
/// 2       2     Reserved
/// 4       4     Start of free space (end of the slot directory)
/// 8       4     End of free space (start of the record data region)
/// 12      12    Reserved
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of slots in use
    pub num_items: u16,
    /// Offset of the first free byte after the slot directory
    pub empty_start: u32,
    /// Offset of the first byte of record data
    pub empty_end: u32,
}

impl PageHeader {
    /// Header of a page that holds no records
    pub fn empty(page_size: usize) -> Self {
        Self {
            num_items: 0,
            empty_start: PAGE_HEADER_SIZE as u32,
            empty_end: page_size as u32,
        }
    }

    /// Read a page header from bytes
    pub fn read(bytes: &[u8]) -> Self {
        Self {
            num_items: read_u16(bytes, 0),
            empty_start: read_u32(bytes, 4),
            empty_end: read_u32(bytes, 8),
        }
    }

    /// Write this header to bytes
    pub fn write(&self, bytes: &mut [u8]) {
        write_u16(bytes, 0, self.num_items);
        write_u16(bytes, 2, 0);
        write_u32(bytes, 4, self.empty_start);
        write_u32(bytes, 8, self.empty_end);
    }

    /// Bytes between the slot directory and the record data
    pub fn free_bytes(&self) -> usize {
        (self.empty_end as usize).saturating_sub(self.empty_start as usize)
    }

    /// Offset of the slot entry with the given index
    pub fn slot_offset(index: usize) -> usize {
        PAGE_HEADER_SIZE + index * SLOT_SIZE
    }

    /// Check the header against the page it was read from.
    ///
    /// Returns a description of the first violated bound.
    pub fn check(&self, page_size: usize) -> Option<String> {
        let expected_start = Self::slot_offset(self.num_items as usize);
        if self.empty_start as usize != expected_start {
            return Some(format!(
                "empty_start {} does not match {} slots (expected {})",
                self.empty_start, self.num_items, expected_start
            ));
        }
        if self.empty_end < self.empty_start || self.empty_end as usize > page_size {
            return Some(format!(
                "empty_end {} outside [{}, {}]",
                self.empty_end, self.empty_start, page_size
            ));
        }
        None
    }
}
