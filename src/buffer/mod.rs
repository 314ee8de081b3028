//! Page cache: bounded in-memory page set with LRU eviction.
//!
//! The page manager keeps recently used pages in memory to avoid disk I/O
//! and writes dirty pages back before evicting them.

mod lru;
mod page_manager;

pub use lru::LruList;
pub use page_manager::PageManager;
