//! Storage layer: sinks, the file format and whole-page I/O.
//!
//! This module provides the random-access sink abstraction, the store file
//! header and the disk manager that reads and writes pages through a sink.

mod disk_manager;
mod file_header;
mod sink;

pub use disk_manager::DiskManager;
pub use file_header::FileHeader;
pub use sink::{FileSink, MemorySink, Sink};
