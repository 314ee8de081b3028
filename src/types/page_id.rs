//! Page and record identifier types.

use std::fmt;

use super::FILE_HEADER_SIZE;

/// Identifier of a page in the store file.
///
/// Page IDs are 0-indexed ordinals counted from the end of the file header,
/// so page 0 is the first page after the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PageId(pub u32);

impl PageId {
    /// Create a new page ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw page ID value
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The page that follows this one in file order
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Calculate the byte offset of this page in the file
    pub const fn file_offset(self, page_size: usize) -> u64 {
        FILE_HEADER_SIZE as u64 + self.0 as u64 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PageId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<PageId> for u32 {
    fn from(id: PageId) -> Self {
        id.0
    }
}

/// Address of a single record: page plus slot index within the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordId {
    pub page: PageId,
    pub slot: usize,
}

impl RecordId {
    pub const fn new(page: PageId, slot: usize) -> Self {
        Self { page, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_PAGE_SIZE;

    #[test]
    fn test_page_id_basics() {
        let id = PageId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.next(), PageId::new(43));
        assert_eq!(u32::from(id), 42);
    }

    #[test]
    fn test_page_id_file_offset() {
        assert_eq!(PageId::new(0).file_offset(DEFAULT_PAGE_SIZE), 8);
        assert_eq!(
            PageId::new(3).file_offset(DEFAULT_PAGE_SIZE),
            8 + 3 * DEFAULT_PAGE_SIZE as u64
        );
    }

    #[test]
    fn test_ordering_is_page_major() {
        let a = RecordId::new(PageId::new(0), 7);
        let b = RecordId::new(PageId::new(1), 0);
        assert!(a < b);
        assert_eq!(format!("{}", b), "(1, 0)");
    }
}
