//! Slotted page implementation.
//!
//! A slotted page uses the following layout:
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                    Page Header                      │
//! ├────────────────────────────────────────────────────┤
//! │                  Slot Directory                     │
//! │  [slot0][slot1][slot2]...      →                   │
//! ├────────────────────────────────────────────────────┤  <- empty_start
//! │                                                    │
//! │                   Free Space                        │
//! │                                                    │
//! ├────────────────────────────────────────────────────┤  <- empty_end
//! │                   Record Data                       │
//! │      ←  [rec2][rec1][rec0]                         │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! Slots are kept in insertion order. Records never move once written.

use crate::error::{Result, StorageError};
use crate::page::{read_u32, write_u32, PageBuf, PageHeader, Slot};
use crate::types::{PageId, SLOT_SIZE};

/// A slotted page holding opaque variable-length records
#[derive(Debug, Clone)]
pub struct SlottedPage {
    /// Position of this page in the file
    id: PageId,
    /// The raw page data
    data: PageBuf,
    /// Cached header (kept in sync with data)
    header: PageHeader,
    /// Set on insert, cleared once the page has been written back
    dirty: bool,
}

impl SlottedPage {
    /// Create a new empty page
    pub fn new(id: PageId, page_size: usize) -> Self {
        let mut data = PageBuf::new(page_size);
        let header = PageHeader::empty(page_size);
        header.write(&mut data);
        Self {
            id,
            data,
            header,
            dirty: false,
        }
    }

    /// Load a page from bytes read off the sink.
    ///
    /// A page without items (including an all-zero page that was allocated
    /// but never written) gets a fresh empty header.
    pub fn from_bytes(id: PageId, bytes: Vec<u8>) -> Result<Self> {
        let mut data = PageBuf::from_vec(bytes);
        let page_size = data.len();
        let mut header = PageHeader::read(&data);

        if header.num_items == 0 {
            header = PageHeader::empty(page_size);
            header.write(&mut data);
        } else if let Some(problem) = header.check(page_size) {
            return Err(StorageError::corruption(format!("page {}: {}", id, problem)));
        }

        Ok(Self {
            id,
            data,
            header,
            dirty: false,
        })
    }

    /// Get the page ID
    pub fn id(&self) -> PageId {
        self.id
    }

    /// Get the raw bytes of this page
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_bytes()
    }

    /// Get the page header
    pub fn header(&self) -> &PageHeader {
        &self.header
    }

    /// Size of this page in bytes
    pub fn page_size(&self) -> usize {
        self.data.len()
    }

    /// Number of records stored in this page
    pub fn item_count(&self) -> usize {
        self.header.num_items as usize
    }

    /// Whether the page differs from its on-disk copy
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Record that the page has been written back
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Raw gap between the slot directory and the record data
    pub fn free_bytes(&self) -> usize {
        self.header.free_bytes()
    }

    /// Largest record this page can still accept.
    ///
    /// `None` once the gap is too small for another slot entry, so that a
    /// record of exactly the returned length always fits.
    pub fn remaining_space(&self) -> Option<usize> {
        self.free_bytes().checked_sub(SLOT_SIZE)
    }

    /// Check if a record of the given length can fit
    pub fn has_space_for(&self, len: usize) -> bool {
        self.remaining_space().is_some_and(|remaining| len <= remaining)
    }

    fn slot(&self, index: usize) -> Slot {
        Slot::unpack(read_u32(&self.data, PageHeader::slot_offset(index)))
    }

    fn set_slot(&mut self, index: usize, slot: Slot) {
        write_u32(&mut self.data, PageHeader::slot_offset(index), slot.pack());
    }

    /// Append a record, returning its slot index.
    ///
    /// Fails with [`StorageError::OutOfSpace`] and leaves the page untouched
    /// if the record plus its slot entry does not fit in the free gap.
    pub fn insert(&mut self, record: &[u8]) -> Result<usize> {
        let size = record.len();
        if !self.has_space_for(size) {
            return Err(StorageError::OutOfSpace {
                page_id: self.id,
                needed: size + SLOT_SIZE,
                available: self.free_bytes(),
            });
        }

        let offset = self.header.empty_end as usize - size;
        self.data[offset..offset + size].copy_from_slice(record);

        let index = self.item_count();
        self.set_slot(index, Slot::new(size, offset));

        self.header.num_items += 1;
        self.header.empty_start += SLOT_SIZE as u32;
        self.header.empty_end = offset as u32;
        self.sync_header();
        self.dirty = true;

        Ok(index)
    }

    /// Borrow the record in the given slot.
    ///
    /// Returns `Ok(None)` if the slot does not exist, and
    /// [`StorageError::Corruption`] if its entry points outside the record
    /// data region.
    pub fn record(&self, index: usize) -> Result<Option<&[u8]>> {
        if index >= self.item_count() {
            return Ok(None);
        }
        let range = self.slot(index).range();
        if range.is_empty() {
            return Ok(Some(&self.data[..0]));
        }
        if range.start < self.header.empty_end as usize || range.end > self.data.len() {
            return Err(StorageError::corruption(format!(
                "page {} slot {}: record {}..{} outside data region {}..{}",
                self.id,
                index,
                range.start,
                range.end,
                self.header.empty_end,
                self.data.len()
            )));
        }
        Ok(Some(&self.data[range]))
    }

    /// Copy out the record in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`item_count`](Self::item_count), or
    /// if the slot entry is corrupt.
    pub fn read(&self, index: usize) -> Vec<u8> {
        match self.record(index) {
            Ok(Some(bytes)) => bytes.to_vec(),
            Ok(None) => panic!(
                "slot index {} out of bounds for page {} ({} items)",
                index,
                self.id,
                self.item_count()
            ),
            Err(err) => panic!("{}", err),
        }
    }

    /// Sync the header to the raw page data
    fn sync_header(&mut self) {
        self.header.write(&mut self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{max_record_size, DEFAULT_PAGE_SIZE, PAGE_HEADER_SIZE};

    fn new_page() -> SlottedPage {
        SlottedPage::new(PageId::new(1), DEFAULT_PAGE_SIZE)
    }

    #[test]
    fn test_new_page() {
        let page = new_page();
        let header = page.header();
        assert_eq!(header.num_items, 0);
        assert_eq!(header.empty_start, PAGE_HEADER_SIZE as u32);
        assert_eq!(header.empty_end, DEFAULT_PAGE_SIZE as u32);
        assert!(!page.is_dirty());
        assert_eq!(page.remaining_space(), Some(max_record_size(DEFAULT_PAGE_SIZE)));
    }

    #[test]
    fn test_insert_and_read() {
        let mut page = new_page();
        let fixture: [&[u8]; 3] = [b"aaa", b"bbbbbbbb", b"cccc"];

        let mut data_len = 0;
        for (i, data) in fixture.iter().enumerate() {
            assert_eq!(page.insert(data).unwrap(), i);
            data_len += data.len();
        }

        for (i, data) in fixture.iter().enumerate() {
            assert_eq!(page.read(i), data.to_vec());
        }
        let header = page.header();
        assert_eq!(header.num_items, 3);
        assert_eq!(
            header.empty_start,
            (PAGE_HEADER_SIZE + SLOT_SIZE * fixture.len()) as u32
        );
        assert_eq!(header.empty_end, (DEFAULT_PAGE_SIZE - data_len) as u32);
        assert!(page.is_dirty());
    }

    #[test]
    fn test_record_bytes_grow_downward() {
        let mut page = new_page();
        page.insert(b"first").unwrap();
        page.insert(b"second").unwrap();

        let end = DEFAULT_PAGE_SIZE;
        assert_eq!(&page.as_bytes()[end - 5..end], b"first");
        assert_eq!(&page.as_bytes()[end - 11..end - 5], b"second");

        let raw = read_u32(page.as_bytes(), PAGE_HEADER_SIZE);
        assert_eq!(raw, (5 << 16) | (end as u32 - 5));
    }

    #[test]
    fn test_free_bytes_shrink_by_slot_and_record() {
        let mut page = new_page();
        for len in [0usize, 1, 17, 300] {
            let before = page.free_bytes();
            page.insert(&vec![0xAB; len]).unwrap();
            assert_eq!(before - page.free_bytes(), SLOT_SIZE + len);
        }
    }

    #[test]
    fn test_capacity_boundary() {
        let mut page = new_page();
        page.insert(b"seed").unwrap();

        let remaining = page.remaining_space().unwrap();
        let too_big = vec![1u8; remaining + 1];
        let before = page.as_bytes().to_vec();
        let err = page.insert(&too_big).unwrap_err();
        assert!(err.is_out_of_space());
        assert_eq!(page.as_bytes(), &before[..]);
        assert_eq!(page.item_count(), 1);

        page.insert(&vec![2u8; remaining]).unwrap();
        assert_eq!(page.free_bytes(), 0);
        assert_eq!(page.remaining_space(), None);
        assert!(!page.has_space_for(0));
        assert!(page.insert(b"").unwrap_err().is_out_of_space());
        assert_eq!(page.read(1), vec![2u8; remaining]);
    }

    #[test]
    fn test_gap_smaller_than_a_slot() {
        // 128 - 24 header bytes, minus 4 for the slot, leaves 100 bytes of payload room
        for gap in 1..SLOT_SIZE {
            let mut page = SlottedPage::new(PageId::new(0), 128);
            page.insert(&vec![7u8; 100 - gap]).unwrap();
            assert_eq!(page.free_bytes(), gap);

            assert_eq!(page.remaining_space(), None);
            assert!(!page.has_space_for(0));
            let before = page.as_bytes().to_vec();
            assert!(page.insert(b"").unwrap_err().is_out_of_space());
            assert_eq!(page.as_bytes(), &before[..]);
        }

        let mut page = SlottedPage::new(PageId::new(0), 128);
        page.insert(&[7u8; 96]).unwrap();
        assert_eq!(page.remaining_space(), Some(0));
        assert!(page.has_space_for(0));
        page.insert(b"").unwrap();
        assert_eq!(page.remaining_space(), None);
    }

    #[test]
    fn test_empty_record() {
        let mut page = new_page();
        page.insert(b"").unwrap();
        page.insert(b"x").unwrap();
        assert_eq!(page.read(0), Vec::<u8>::new());
        assert_eq!(page.read(1), b"x".to_vec());
    }

    #[test]
    fn test_record_out_of_range() {
        let mut page = new_page();
        page.insert(b"only").unwrap();
        assert!(page.record(1).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_slot_is_reported() {
        let mut page = new_page();
        page.insert(b"payload").unwrap();
        page.insert(b"").unwrap();

        // Point slot 0 into the slot directory
        page.set_slot(0, Slot::new(7, PAGE_HEADER_SIZE));
        let err = page.record(0).unwrap_err();
        assert!(matches!(err, StorageError::Corruption(_)));

        // Run past the end of the page
        page.set_slot(0, Slot::new(7, DEFAULT_PAGE_SIZE - 3));
        assert!(page.record(0).is_err());

        // Empty records read back empty from any offset
        page.set_slot(1, Slot::new(0, 5));
        assert_eq!(page.record(1).unwrap(), Some(&[][..]));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_read_out_of_range_panics() {
        let page = new_page();
        page.read(0);
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let mut page = new_page();
        page.insert(b"test").unwrap();
        page.insert(b"data").unwrap();

        let restored = SlottedPage::from_bytes(page.id(), page.as_bytes().to_vec()).unwrap();
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.read(0), b"test");
        assert_eq!(restored.read(1), b"data");
        assert!(!restored.is_dirty());
        assert_eq!(restored.remaining_space(), page.remaining_space());
        assert!(restored.remaining_space().is_some());
    }

    #[test]
    fn test_from_zeroed_bytes_is_empty_page() {
        let page = SlottedPage::from_bytes(PageId::new(4), vec![0u8; DEFAULT_PAGE_SIZE]).unwrap();
        assert_eq!(*page.header(), PageHeader::empty(DEFAULT_PAGE_SIZE));
        assert_eq!(page.remaining_space(), Some(max_record_size(DEFAULT_PAGE_SIZE)));
    }

    #[test]
    fn test_from_bytes_rejects_bad_header() {
        let mut bytes = vec![0u8; DEFAULT_PAGE_SIZE];
        let header = PageHeader {
            num_items: 1,
            empty_start: PAGE_HEADER_SIZE as u32,
            empty_end: DEFAULT_PAGE_SIZE as u32,
        };
        header.write(&mut bytes);
        let err = SlottedPage::from_bytes(PageId::new(0), bytes).unwrap_err();
        assert!(matches!(err, StorageError::Corruption(_)));
    }

    #[test]
    fn test_mark_clean() {
        let mut page = new_page();
        page.insert(b"x").unwrap();
        assert!(page.is_dirty());
        page.mark_clean();
        assert!(!page.is_dirty());
    }
}
