//! Full-table scan.
//!
//! Records are visited in page order, then slot order within each page.

mod cursor;

pub use cursor::Cursor;
