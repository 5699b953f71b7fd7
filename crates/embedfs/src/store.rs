//! Byte stores that can carry an embedded archive
//!
//! A container is any store offering sequential read and write, absolute
//! seek, positional reads, truncation and a size query. Regular files are the
//! usual case; [`MemoryStore`] keeps everything in a `Vec<u8>`.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Capability set required from the byte store behind a container
///
/// Positional reads take `&self` so that several bounded readers can borrow
/// the same store at once. Whether such reads are safe across threads is up
/// to the implementation.
pub trait Store: Read + Write + Seek {
    /// Read into `buf` starting at absolute `offset` without moving the cursor
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Current length of the store in bytes
    fn size(&self) -> io::Result<u64>;

    /// Cut or extend the store to exactly `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Store for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    // seek_read moves the file cursor on Windows; callers never rely on the
    // cursor while reading entries, only while embedding and opening.
    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
}

/// In-memory store backed by a growable buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    inner: Cursor<Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `data`, with the cursor placed at its end
    ///
    /// This matches a file freshly written with the host blob, ready for an
    /// embedder to append to.
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        let end = data.len() as u64;
        let mut inner = Cursor::new(data);
        inner.set_position(end);
        Self { inner }
    }

    /// Borrow the stored bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// Mutably borrow the stored bytes
    pub fn as_bytes_mut(&mut self) -> &mut Vec<u8> {
        self.inner.get_mut()
    }

    /// Take the stored bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl From<Vec<u8>> for MemoryStore {
    fn from(data: Vec<u8>) -> Self {
        Self::with_contents(data)
    }
}

impl Read for MemoryStore {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for MemoryStore {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStore {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl Store for MemoryStore {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.inner.get_ref();
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= data.len() {
            return Ok(0);
        }

        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.inner.get_ref().len() as u64)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length too large"))?;
        self.inner.get_mut().resize(len, 0);
        Ok(())
    }
}
