//! Disk manager implementation.
//!
//! The disk manager owns the sink holding the store file. It knows the page
//! size, translates page IDs to byte offsets, reads and writes whole pages
//! and manages the file header.

use crate::error::{Result, StorageError};
use crate::page::SlottedPage;
use crate::storage::{FileHeader, FileSink, Sink};
use crate::types::{is_valid_page_size, PageId, FILE_HEADER_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use std::path::Path;
use tracing::{debug, info};

/// File layer over a [`Sink`]
pub struct DiskManager {
    /// The backing store
    sink: Box<dyn Sink>,
    /// The file header (cached)
    header: FileHeader,
    /// Whether to sync after each page write
    sync_on_write: bool,
}

impl DiskManager {
    /// Create a new store file, truncating any existing file at `path`
    pub fn create(path: &Path, page_size: usize) -> Result<Self> {
        check_page_size(page_size)?;
        let sink = FileSink::create(path)?;
        let dm = Self::create_with_sink(Box::new(sink), page_size)?;
        info!(path = %path.display(), page_size, "disk.create");
        Ok(dm)
    }

    /// Initialise a store on an empty sink
    pub fn create_with_sink(sink: Box<dyn Sink>, page_size: usize) -> Result<Self> {
        if let Err(err) = check_page_size(page_size) {
            return Err(err.with_cleanup(sink.close()));
        }
        match sink.size() {
            Ok(0) => {}
            Ok(size) => {
                let err = StorageError::invalid_config(format!(
                    "cannot create a store on a non-empty sink ({} bytes)",
                    size
                ));
                return Err(err.with_cleanup(sink.close()));
            }
            Err(err) => return Err(StorageError::from(err).with_cleanup(sink.close())),
        }

        let dm = Self {
            sink,
            header: FileHeader::new(page_size),
            sync_on_write: false,
        };
        if let Err(err) = dm.write_header() {
            return Err(err.with_cleanup(dm.sink.close()));
        }
        Ok(dm)
    }

    /// Open an existing store file
    pub fn open(path: &Path) -> Result<Self> {
        let sink = FileSink::open(path)?;
        let dm = Self::open_with_sink(Box::new(sink))?;
        info!(path = %path.display(), page_size = dm.page_size(), "disk.open");
        Ok(dm)
    }

    /// Open a store held by `sink`, validating its header and size.
    ///
    /// The sink is closed before any error is returned.
    pub fn open_with_sink(sink: Box<dyn Sink>) -> Result<Self> {
        let header = match read_header(sink.as_ref()) {
            Ok(header) => header,
            Err(err) => return Err(err.with_cleanup(sink.close())),
        };

        let dm = Self {
            sink,
            header,
            sync_on_write: false,
        };
        if let Err(err) = dm.page_count() {
            return Err(err.with_cleanup(dm.sink.close()));
        }
        Ok(dm)
    }

    /// Sync the sink after every page write
    pub fn with_sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }

    /// Page size used by this file
    pub fn page_size(&self) -> usize {
        self.header.page_size()
    }

    /// Number of pages in the file, derived from its size.
    ///
    /// A size that is not the header plus a whole number of pages is
    /// reported as corruption rather than rounded down.
    pub fn page_count(&self) -> Result<u32> {
        let size = self.sink.size()?;
        let page_size = self.page_size() as u64;
        let body = size.checked_sub(FILE_HEADER_SIZE as u64).ok_or_else(|| {
            StorageError::corruption(format!("file size {} is smaller than the header", size))
        })?;
        if body % page_size != 0 {
            return Err(StorageError::corruption(format!(
                "file size {} is not the header plus whole {}-byte pages ({} trailing bytes)",
                size,
                page_size,
                body % page_size
            )));
        }
        Ok((body / page_size) as u32)
    }

    /// Read a page from the sink
    pub fn read_page(&self, page_id: PageId) -> Result<SlottedPage> {
        if page_id.value() >= self.page_count()? {
            return Err(StorageError::PageNotFound(page_id));
        }

        let page_size = self.page_size();
        let mut buf = vec![0u8; page_size];
        self.sink.read_at(&mut buf, page_id.file_offset(page_size))?;

        SlottedPage::from_bytes(page_id, buf)
    }

    /// Write a page back to its place in the file
    pub fn write_page(&self, page: &SlottedPage) -> Result<()> {
        debug_assert_eq!(page.page_size(), self.page_size());

        let offset = page.id().file_offset(self.page_size());
        self.sink.write_at(page.as_bytes(), offset)?;

        if self.sync_on_write {
            self.sink.sync()?;
        }
        Ok(())
    }

    /// Append an all-zero page to the end of the file.
    ///
    /// The page is persisted before it is returned, so the page count
    /// derived from the file size already includes it. If the append fails
    /// the file is truncated back to its previous length.
    pub fn allocate_page(&mut self) -> Result<SlottedPage> {
        let page_id = PageId::new(self.page_count()?);
        let page_size = self.page_size();
        let offset = page_id.file_offset(page_size);

        let zeros = vec![0u8; page_size];
        if let Err(err) = self.sink.write_at(&zeros, offset) {
            // A torn append leaves the size off a page boundary
            return Err(StorageError::from(err).with_cleanup(self.sink.set_len(offset)));
        }
        if self.sync_on_write {
            self.sink.sync()?;
        }

        debug!(page_id = %page_id, "disk.allocate_page");
        Ok(SlottedPage::new(page_id, page_size))
    }

    /// Rewrite the file header
    pub fn write_header(&self) -> Result<()> {
        self.sink.write_at(&self.header.to_bytes(), 0)?;
        Ok(())
    }

    /// Sync all written data to durable storage
    pub fn sync(&self) -> Result<()> {
        self.sink.sync()?;
        Ok(())
    }

    /// Close the underlying sink
    pub fn close(self) -> Result<()> {
        self.sink.close()?;
        debug!("disk.close");
        Ok(())
    }
}

fn check_page_size(page_size: usize) -> Result<()> {
    if is_valid_page_size(page_size) {
        Ok(())
    } else {
        Err(StorageError::invalid_config(format!(
            "page size {} outside {}..={}",
            page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
        )))
    }
}

fn read_header(sink: &dyn Sink) -> Result<FileHeader> {
    let size = sink.size()?;
    if size < FILE_HEADER_SIZE as u64 {
        return Err(StorageError::invalid_format(format!(
            "file too short for a header: {} bytes",
            size
        )));
    }
    let mut buf = [0u8; FILE_HEADER_SIZE];
    sink.read_at(&mut buf, 0)?;
    FileHeader::read(&buf)
}
