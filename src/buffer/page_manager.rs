//! Page manager implementation.
//!
//! The page manager caches a bounded number of pages in memory, evicting
//! the least recently used page when full and writing dirty pages back
//! before their buffers are dropped. It also decides which page a new
//! record goes to.

use crate::buffer::lru::LruList;
use crate::error::{Result, StorageError};
use crate::page::SlottedPage;
use crate::storage::DiskManager;
use crate::types::{max_record_size, PageId, DEFAULT_CACHE_CAPACITY};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Bounded page cache with LRU eviction over a [`DiskManager`]
pub struct PageManager {
    /// The file layer for I/O
    disk: DiskManager,
    /// Resident pages indexed by page ID
    pages: HashMap<PageId, SlottedPage>,
    /// Recency ordering used to pick eviction victims
    lru: LruList,
    /// Maximum number of resident pages
    capacity: usize,
}

impl PageManager {
    /// Create a page manager with the default capacity
    pub fn new(disk: DiskManager) -> Self {
        Self::with_capacity(disk, DEFAULT_CACHE_CAPACITY)
    }

    /// Create a page manager holding at most `capacity` pages (at least one)
    pub fn with_capacity(disk: DiskManager, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            disk,
            pages: HashMap::with_capacity(capacity),
            lru: LruList::with_capacity(capacity),
            capacity,
        }
    }

    /// Fetch a page, loading it from disk if it is not resident.
    ///
    /// Every fetch makes the page the most recently used one.
    pub fn get_page(&mut self, page_id: PageId) -> Result<&mut SlottedPage> {
        if !self.pages.contains_key(&page_id) {
            self.make_room()?;
            let page = self.disk.read_page(page_id)?;
            trace!(page_id = %page_id, "buffer.load_page");
            self.pages.insert(page_id, page);
        }

        self.lru.touch(page_id);
        self.pages
            .get_mut(&page_id)
            .ok_or(StorageError::PageNotFound(page_id))
    }

    /// Append a fresh page to the file and cache it
    pub fn allocate_page(&mut self) -> Result<&mut SlottedPage> {
        self.make_room()?;
        let page = self.disk.allocate_page()?;
        let page_id = page.id();

        self.pages.insert(page_id, page);
        self.lru.touch(page_id);
        self.pages
            .get_mut(&page_id)
            .ok_or(StorageError::PageNotFound(page_id))
    }

    /// Evict one page if the cache is full
    fn make_room(&mut self) -> Result<()> {
        if self.pages.len() >= self.capacity {
            self.evict_one()?;
        }
        Ok(())
    }

    /// Evict the least recently used page.
    ///
    /// A dirty victim is written back first. If the write fails the page
    /// stays cached and dirty and the error is returned.
    pub fn evict_one(&mut self) -> Result<()> {
        let Some(page_id) = self.lru.lru() else {
            return Ok(());
        };

        if let Some(page) = self.pages.get_mut(&page_id) {
            if page.is_dirty() {
                self.disk.write_page(page)?;
                page.mark_clean();
            }
        }

        self.pages.remove(&page_id);
        self.lru.remove(page_id);
        debug!(page_id = %page_id, "buffer.evict");
        Ok(())
    }

    /// Store a record in the first page (by page ID) with room for it,
    /// allocating a new page if none has room.
    pub fn insert_data(&mut self, record: &[u8]) -> Result<()> {
        let max = max_record_size(self.page_size());
        if record.len() > max {
            return Err(StorageError::RecordTooLarge {
                size: record.len(),
                max,
            });
        }

        let page_count = self.disk.page_count()?;
        for id in 0..page_count {
            let page = self.get_page(PageId::new(id))?;
            if !page.has_space_for(record.len()) {
                continue;
            }
            match page.insert(record) {
                Ok(_) => return Ok(()),
                Err(err) if err.is_out_of_space() => continue,
                Err(err) => return Err(err),
            }
        }

        let page = self.allocate_page()?;
        page.insert(record)?;
        Ok(())
    }

    /// Write one resident page back if it is dirty
    pub fn flush_page(&mut self, page_id: PageId) -> Result<()> {
        if let Some(page) = self.pages.get_mut(&page_id) {
            if page.is_dirty() {
                self.disk.write_page(page)?;
                page.mark_clean();
            }
        }
        Ok(())
    }

    /// Write every dirty resident page back, in page ID order.
    ///
    /// Stops at the first failure; pages written before it stay clean.
    pub fn flush_all(&mut self) -> Result<()> {
        let mut dirty: Vec<PageId> = self
            .pages
            .values()
            .filter(|page| page.is_dirty())
            .map(SlottedPage::id)
            .collect();
        dirty.sort_unstable();

        for page_id in &dirty {
            self.flush_page(*page_id)?;
        }
        if !dirty.is_empty() {
            debug!(pages = dirty.len(), "buffer.flush_all");
        }
        Ok(())
    }

    /// Borrow the file layer
    pub fn disk(&self) -> &DiskManager {
        &self.disk
    }

    /// Give up the cache and return the file layer.
    ///
    /// Dirty pages still in the cache are dropped; flush first.
    pub fn into_disk(self) -> DiskManager {
        self.disk
    }

    /// Number of pages in the file
    pub fn page_count(&self) -> Result<u32> {
        self.disk.page_count()
    }

    /// Page size of the file
    pub fn page_size(&self) -> usize {
        self.disk.page_size()
    }

    /// Maximum number of resident pages
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident pages
    pub fn cached_pages(&self) -> usize {
        self.pages.len()
    }

    /// Number of resident pages not yet written back
    pub fn dirty_pages(&self) -> usize {
        self.pages.values().filter(|page| page.is_dirty()).count()
    }

    /// Whether a page is resident
    pub fn is_cached(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Resident page IDs from most to least recently used
    pub fn recency(&self) -> Vec<PageId> {
        self.lru.iter().collect()
    }
}
