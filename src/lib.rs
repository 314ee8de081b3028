//! # pagestore
//!
//! An embedded, single-file record store. Variable-length byte records are
//! kept in fixed-size slotted pages behind a bounded LRU page cache.
//!
//! ## Architecture
//!
//! The store is composed of small layers, leaves first:
//!
//! - **Storage Layer** (`storage`): random-access sinks, the file header and
//!   whole-page I/O
//! - **Page Layer** (`page`): slotted page format with a slot directory
//! - **Page Cache** (`buffer`): LRU page cache with dirty tracking and
//!   first-fit record placement
//! - **Scan** (`scan`): cursor over every record in page/slot order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagestore::{Config, Database};
//!
//! let mut db = Database::create(Config::new("records.db"))?;
//! db.insert(b"hello")?;
//! db.insert(b"world")?;
//!
//! for record in db.scan() {
//!     println!("{:?}", record?);
//! }
//!
//! db.close()?;
//! ```
//!
//! A `Database` has a single owner and no internal locking. Embedders that
//! share one across threads must wrap it in a mutex.

pub mod buffer;
pub mod error;
pub mod page;
pub mod scan;
pub mod storage;
pub mod types;

pub use error::{Result, StorageError};
pub use types::{PageId, RecordId, DEFAULT_CACHE_CAPACITY, DEFAULT_PAGE_SIZE};

pub use buffer::PageManager;
pub use page::SlottedPage;
pub use scan::Cursor;
pub use storage::{DiskManager, FileSink, MemorySink, Sink};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Path to the database file
    #[serde(default)]
    pub path: PathBuf,
    /// Page size used when creating a file (default: 8KB); an opened file
    /// keeps the page size recorded in its header
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Page cache size in number of pages (default: 1024)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Whether to sync after every page write (default: false)
    #[serde(default)]
    pub sync_on_write: bool,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

impl Config {
    /// Create a new configuration with default settings
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            sync_on_write: false,
        }
    }

    /// Set page size for newly created files
    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// Set page cache size
    pub fn cache_capacity(mut self, pages: usize) -> Self {
        self.cache_capacity = pages;
        self
    }

    /// Enable sync on write for durability
    pub fn sync_on_write(mut self, enabled: bool) -> Self {
        self.sync_on_write = enabled;
        self
    }
}

/// Main database handle
///
/// Composes the file layer and the page cache and exposes the record-level
/// operations. Call [`close`](Database::close) when done; dropping the
/// handle discards pages that were not flushed.
pub struct Database {
    pages: PageManager,
}

impl Database {
    /// Create a new database file, replacing any file at the path
    pub fn create(config: Config) -> Result<Self> {
        let disk = DiskManager::create(&config.path, config.page_size)?
            .with_sync_on_write(config.sync_on_write);
        Ok(Self::from_disk(disk, config.cache_capacity))
    }

    /// Open an existing database file
    pub fn open(config: Config) -> Result<Self> {
        let disk = DiskManager::open(&config.path)?.with_sync_on_write(config.sync_on_write);
        Ok(Self::from_disk(disk, config.cache_capacity))
    }

    /// Build a database over an already created or opened file layer
    pub fn from_disk(disk: DiskManager, cache_capacity: usize) -> Self {
        Self {
            pages: PageManager::with_capacity(disk, cache_capacity),
        }
    }

    /// Append a record
    pub fn insert(&mut self, record: &[u8]) -> Result<()> {
        self.pages.insert_data(record)
    }

    /// Cursor over every record, starting at the first one
    pub fn scan(&mut self) -> Cursor<'_> {
        Cursor::new(&mut self.pages)
    }

    /// Collect every record in scan order
    pub fn records(&mut self) -> Result<Vec<Vec<u8>>> {
        self.scan().collect()
    }

    /// Write all dirty pages and the header, then sync the file
    pub fn flush(&mut self) -> Result<()> {
        self.pages.flush_all()?;
        let disk = self.pages.disk();
        disk.write_header()?;
        disk.sync()
    }

    /// Flush and close the file.
    ///
    /// The file is closed even if the flush fails; if both fail the returned
    /// error carries both failures.
    pub fn close(mut self) -> Result<()> {
        let flushed = self.flush();
        if let Err(err) = &flushed {
            warn!(error = %err, "db.close.flush_failed");
        }
        let closed = self.pages.into_disk().close();
        let result = error::combine(flushed, closed);
        if result.is_ok() {
            info!("db.close");
        }
        result
    }

    /// Page size of the open file
    pub fn page_size(&self) -> usize {
        self.pages.page_size()
    }

    /// Get statistics about the database
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            page_size: self.pages.page_size(),
            page_count: self.pages.page_count()? as usize,
            cached_pages: self.pages.cached_pages(),
            dirty_pages: self.pages.dirty_pages(),
            cache_capacity: self.pages.capacity(),
        })
    }
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbStats {
    /// Page size in bytes
    pub page_size: usize,
    /// Total number of pages in the file
    pub page_count: usize,
    /// Pages currently held in the cache
    pub cached_pages: usize,
    /// Cached pages not yet written back
    pub dirty_pages: usize,
    /// Page cache capacity
    pub cache_capacity: usize,
}
