//! Common types and format constants used throughout the store.

mod page_id;

pub use page_id::{PageId, RecordId};

/// Magic number at offset 0 of every store file ("GODB" read little-endian)
pub const FILE_MAGIC: u32 = 0x4244_4F47;

/// Size of the file header: magic (u32) + page size (u32)
pub const FILE_HEADER_SIZE: usize = 8;

/// Size of the fixed header at the start of every page
pub const PAGE_HEADER_SIZE: usize = 24;

/// Width of one slot directory entry (`size << 16 | offset`)
pub const SLOT_SIZE: usize = 4;

/// Page size used for new files unless configured otherwise (8KB)
pub const DEFAULT_PAGE_SIZE: usize = 8 * 1024;

/// Smallest accepted page size
pub const MIN_PAGE_SIZE: usize = 64;

/// Largest accepted page size; slot offsets are 16 bits wide
pub const MAX_PAGE_SIZE: usize = 64 * 1024;

/// Number of pages the cache holds by default
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Check whether a page size can be used by the on-disk format
pub fn is_valid_page_size(page_size: usize) -> bool {
    (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size)
}

/// Largest record that fits in an empty page of the given size
pub fn max_record_size(page_size: usize) -> usize {
    page_size.saturating_sub(PAGE_HEADER_SIZE + SLOT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_bounds() {
        assert!(is_valid_page_size(DEFAULT_PAGE_SIZE));
        assert!(is_valid_page_size(MIN_PAGE_SIZE));
        assert!(is_valid_page_size(MAX_PAGE_SIZE));
        assert!(!is_valid_page_size(MIN_PAGE_SIZE - 1));
        assert!(!is_valid_page_size(MAX_PAGE_SIZE + 1));
    }

    #[test]
    fn test_max_record_size_fits_slot() {
        assert_eq!(max_record_size(DEFAULT_PAGE_SIZE), 8192 - 28);
        assert!(max_record_size(MAX_PAGE_SIZE) <= u16::MAX as usize);
    }

    #[test]
    fn test_magic_bytes() {
        assert_eq!(&FILE_MAGIC.to_le_bytes(), b"GODB");
    }
}
