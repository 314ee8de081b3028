//! Random-access byte sinks backing the store file.
//!
//! The rest of the engine only sees the [`Sink`] trait, so the file can be
//! swapped for an in-memory buffer in tests or for embedding.

use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;

/// Random-access byte store.
///
/// Reads and writes transfer the whole buffer or fail; a short transfer is
/// reported as an error, never as partial success.
pub trait Sink: Send {
    /// Fill `buf` with the bytes starting at `offset`
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()>;

    /// Write all of `buf` starting at `offset`, extending the sink if needed
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()>;

    /// Current size in bytes
    fn size(&self) -> io::Result<u64>;

    /// Truncate or zero-extend the sink to `len` bytes
    fn set_len(&self, len: u64) -> io::Result<()>;

    /// Push written data to durable storage
    fn sync(&self) -> io::Result<()>;

    /// Release the sink
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// Sink backed by a file on disk
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    /// Create (or truncate) a file for reading and writing
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::from_file(file))
    }

    /// Open an existing file for reading and writing
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self::from_file(file))
    }

    /// Wrap an already opened file
    pub fn from_file(file: File) -> Self {
        Self {
            file: Mutex::new(file),
        }
    }
}

impl Sink for FileSink {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.file.lock().metadata()?.len())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        self.file.lock().set_len(len)
    }

    fn sync(&self) -> io::Result<()> {
        self.file.lock().sync_data()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let sink = *self;
        sink.file.into_inner().sync_all()
    }
}

/// Sink backed by a shared in-memory buffer.
///
/// Clones share the same buffer, so a store can be closed and reopened over
/// the same bytes.
#[derive(Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink holding the given bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: Arc::new(Mutex::new(bytes)),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }
}

impl Sink for MemorySink {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let data = self.data.lock();
        let start = offset as usize;
        let end = start + buf.len();
        if end > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("read of {} bytes at {} past end ({})", buf.len(), offset, data.len()),
            ));
        }
        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        let mut data = self.data.lock();
        let start = offset as usize;
        let end = start + buf.len();
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data.lock().len() as u64)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        self.data.lock().resize(len as usize, 0);
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_sink_read_write() -> io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("sink.db");

        let sink = FileSink::create(&path)?;
        sink.write_at(b"hello", 0)?;
        sink.write_at(b"world", 10)?;
        assert_eq!(sink.size()?, 15);

        let mut buf = [0u8; 5];
        sink.read_at(&mut buf, 10)?;
        assert_eq!(&buf, b"world");

        let mut gap = [0xFFu8; 5];
        sink.read_at(&mut gap, 5)?;
        assert_eq!(gap, [0u8; 5]);

        Box::new(sink).close()?;

        let reopened = FileSink::open(&path)?;
        let mut buf = [0u8; 5];
        reopened.read_at(&mut buf, 0)?;
        assert_eq!(&buf, b"hello");
        Ok(())
    }

    #[test]
    fn test_file_sink_short_read_is_error() -> io::Result<()> {
        let dir = tempdir()?;
        let sink = FileSink::create(&dir.path().join("short.db"))?;
        sink.write_at(b"abc", 0)?;

        let mut buf = [0u8; 8];
        let err = sink.read_at(&mut buf, 0).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        Ok(())
    }

    #[test]
    fn test_file_sink_open_missing() {
        let dir = tempdir().unwrap();
        assert!(FileSink::open(&dir.path().join("missing.db")).is_err());
    }

    #[test]
    fn test_set_len_truncates() -> io::Result<()> {
        let dir = tempdir()?;
        let file = FileSink::create(&dir.path().join("len.db"))?;
        let memory = MemorySink::new();

        for sink in [&file as &dyn Sink, &memory] {
            sink.write_at(b"0123456789", 0)?;
            sink.set_len(4)?;
            assert_eq!(sink.size()?, 4);
            let mut buf = [0u8; 4];
            sink.read_at(&mut buf, 0)?;
            assert_eq!(&buf, b"0123");
        }
        Ok(())
    }

    #[test]
    fn test_memory_sink_shares_buffer() -> io::Result<()> {
        let sink = MemorySink::new();
        let other = sink.clone();
        sink.write_at(b"xyz", 2)?;

        assert_eq!(other.snapshot(), vec![0, 0, b'x', b'y', b'z']);
        assert_eq!(other.size()?, 5);

        let mut buf = [0u8; 4];
        let err = other.read_at(&mut buf, 2).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        Ok(())
    }
}
