//! Cursor over every record in the store.
//!
//! The cursor only remembers a (page, slot) position. Each step fetches the
//! page through the page manager, so scanning shares the cache and its
//! eviction policy with inserts, and page and item counts are re-read on
//! every call.

use crate::buffer::PageManager;
use crate::error::{Result, StorageError};
use crate::types::RecordId;

/// Forward-only, restartable cursor over all records
pub struct Cursor<'a> {
    /// The page cache used for page access
    pages: &'a mut PageManager,
    /// Position of the next record to return
    position: RecordId,
    /// Set once iteration hit an error, to stop the iterator
    failed: bool,
}

impl<'a> Cursor<'a> {
    /// Create a cursor positioned at the first record
    pub fn new(pages: &'a mut PageManager) -> Self {
        Self {
            pages,
            position: RecordId::default(),
            failed: false,
        }
    }

    /// Position of the record the next call to
    /// [`next_record`](Self::next_record) will return
    pub fn position(&self) -> RecordId {
        self.position
    }

    /// Restart from the first record
    pub fn rewind(&mut self) {
        self.position = RecordId::default();
        self.failed = false;
    }

    /// Check whether another record is available.
    ///
    /// Pages without records are skipped. Calling this repeatedly without
    /// consuming a record returns the same answer.
    pub fn advance(&mut self) -> Result<bool> {
        loop {
            let page_count = self.pages.page_count()?;
            if self.position.page.value() >= page_count {
                return Ok(false);
            }

            let items = self.pages.get_page(self.position.page)?.item_count();
            if self.position.slot < items {
                return Ok(true);
            }
            self.position = RecordId::new(self.position.page.next(), 0);
        }
    }

    /// Return a copy of the current record and move past it.
    ///
    /// Fails with [`StorageError::CursorExhausted`] once every record has
    /// been returned.
    pub fn next_record(&mut self) -> Result<Vec<u8>> {
        if !self.advance()? {
            return Err(StorageError::CursorExhausted);
        }

        let RecordId { page, slot } = self.position;
        let current = self.pages.get_page(page)?;
        let items = current.item_count();
        let record = match current.record(slot)? {
            Some(bytes) => bytes.to_vec(),
            None => return Err(StorageError::CursorExhausted),
        };

        self.position = if slot + 1 < items {
            RecordId::new(page, slot + 1)
        } else {
            RecordId::new(page.next(), 0)
        };
        Ok(record)
    }
}

impl Iterator for Cursor<'_> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.advance() {
            Ok(false) => return None,
            Ok(true) => self.next_record(),
            Err(err) => Err(err),
        };
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DiskManager, MemorySink};
    use crate::types::PageId;

    const PAGE_SIZE: usize = 128;

    fn manager(capacity: usize) -> PageManager {
        let disk = DiskManager::create_with_sink(Box::new(MemorySink::new()), PAGE_SIZE).unwrap();
        PageManager::with_capacity(disk, capacity)
    }

    #[test]
    fn test_empty_store() -> Result<()> {
        let mut pm = manager(4);
        let mut cursor = Cursor::new(&mut pm);
        assert!(!cursor.advance()?);
        assert!(matches!(
            cursor.next_record(),
            Err(StorageError::CursorExhausted)
        ));
        assert!(cursor.next().is_none());
        Ok(())
    }

    #[test]
    fn test_scan_in_insert_order() -> Result<()> {
        let mut pm = manager(4);
        let fixture: [&[u8]; 3] = [b"aaa", b"bbbbbbbb", b"cccc"];
        for record in fixture {
            pm.insert_data(record)?;
        }

        let records: Vec<Vec<u8>> = Cursor::new(&mut pm).collect::<Result<_>>()?;
        assert_eq!(records, vec![b"aaa".to_vec(), b"bbbbbbbb".to_vec(), b"cccc".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_advance_is_idempotent() -> Result<()> {
        let mut pm = manager(4);
        pm.insert_data(b"one")?;
        pm.insert_data(b"two")?;

        let mut cursor = Cursor::new(&mut pm);
        let expected_records: [&[u8]; 2] = [b"one", b"two"];
        for expected in expected_records {
            assert!(cursor.advance()?);
            assert!(cursor.advance()?);
            assert_eq!(cursor.next_record()?, expected);
        }
        assert!(!cursor.advance()?);
        assert!(!cursor.advance()?);
        assert!(matches!(
            cursor.next_record(),
            Err(StorageError::CursorExhausted)
        ));
        Ok(())
    }

    #[test]
    fn test_page_major_order_across_pages() -> Result<()> {
        let mut pm = manager(4);
        // Each record takes a little over a third of a page
        let records: Vec<Vec<u8>> = (0..7u8).map(|i| vec![i; 30]).collect();
        for record in &records {
            pm.insert_data(record)?;
        }
        assert_eq!(pm.page_count()?, 3);

        let mut cursor = Cursor::new(&mut pm);
        let mut seen = Vec::new();
        while cursor.advance()? {
            let position = cursor.position();
            seen.push((position, cursor.next_record()?));
        }

        let positions: Vec<(u32, usize)> = seen
            .iter()
            .map(|(pos, _)| (pos.page.value(), pos.slot))
            .collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
        let scanned: Vec<Vec<u8>> = seen.into_iter().map(|(_, r)| r).collect();
        assert_eq!(scanned, records);
        Ok(())
    }

    #[test]
    fn test_skips_empty_pages() -> Result<()> {
        let mut pm = manager(4);
        pm.allocate_page()?;
        pm.insert_data(b"x")?;
        pm.allocate_page()?;
        pm.allocate_page()?;
        let page = pm.get_page(PageId::new(2))?;
        page.insert(b"y")?;

        let records: Vec<Vec<u8>> = Cursor::new(&mut pm).collect::<Result<_>>()?;
        assert_eq!(records, vec![b"x".to_vec(), b"y".to_vec()]);
        Ok(())
    }

    #[test]
    fn test_rewind() -> Result<()> {
        let mut pm = manager(4);
        pm.insert_data(b"r")?;

        let mut cursor = Cursor::new(&mut pm);
        assert_eq!(cursor.next_record()?, b"r");
        assert!(!cursor.advance()?);
        cursor.rewind();
        assert_eq!(cursor.position(), RecordId::default());
        assert_eq!(cursor.next_record()?, b"r");
        Ok(())
    }

    #[test]
    fn test_scan_goes_through_cache() -> Result<()> {
        let mut pm = manager(2);
        for i in 0..4u8 {
            pm.insert_data(&vec![i; PAGE_SIZE - 28])?;
        }

        let count = Cursor::new(&mut pm).collect::<Result<Vec<_>>>()?.len();
        assert_eq!(count, 4);
        assert_eq!(pm.cached_pages(), 2);
        assert_eq!(pm.recency(), vec![PageId::new(3), PageId::new(2)]);
        Ok(())
    }
}
