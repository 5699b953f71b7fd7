//! Reading one embedded file
//!
//! A [`BoundedReader`] serves sequential reads from the byte range
//! `[content_offset, content_offset + content_length)` of the container
//! store. It borrows the store from its [`Container`](crate::Container), so
//! any number of readers may be open at once and none of them can outlive
//! the container.

use std::io::{self, SeekFrom};

use crate::container::Entry;
use crate::error::{EmbedFsError, Result};
use crate::store::Store;

/// File-like capability set of an embedded file
///
/// Embedded files are read-only and sequential. Positional reads, seeking
/// and stat are part of the interface but not supported yet; they fail with
/// [`EmbedFsError::NotImplemented`]. Writes fail with
/// [`EmbedFsError::NotAvailable`].
pub trait EmbeddedFile {
    /// Normalized name of the entry
    fn name(&self) -> &str;

    /// Read the next bytes into `buf`, returning 0 at end of file
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Read at an offset relative to the entry start
    fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize>;

    /// Move the read cursor
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Entry metadata
    fn stat(&self) -> Result<Entry>;

    /// Write into the entry
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Change the entry length
    fn truncate(&mut self, len: u64) -> Result<()>;

    /// Release the handle
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Sequential reader over one entry's content range
#[derive(Debug)]
pub struct BoundedReader<'a, S: Store> {
    name: String,
    store: &'a S,
    content_offset: u64,
    content_length: u64,
    read_offset: u64,
}

impl<'a, S: Store> BoundedReader<'a, S> {
    pub(crate) fn new(store: &'a S, entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            store,
            content_offset: entry.content_offset,
            content_length: entry.content_length,
            read_offset: 0,
        }
    }

    /// Content length in bytes
    pub fn len(&self) -> u64 {
        self.content_length
    }

    /// Whether the entry has no content
    pub fn is_empty(&self) -> bool {
        self.content_length == 0
    }

    /// Bytes left before end of file
    pub fn remaining(&self) -> u64 {
        self.content_length - self.read_offset
    }

    fn read_bounded(&mut self, buf: &mut [u8]) -> Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let wanted = usize::try_from(remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let n = self
            .store
            .read_at(&mut buf[..wanted], self.content_offset + self.read_offset)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "store ended with {remaining} bytes of {} unread",
                    self.name
                ),
            )
            .into());
        }

        // Never hand out bytes belonging to the next entry or the trailer
        let n = n.min(wanted);
        self.read_offset += n as u64;
        Ok(n)
    }
}

impl<S: Store> EmbeddedFile for BoundedReader<'_, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.read_bounded(buf)
    }

    fn read_at(&self, _buf: &mut [u8], _offset: u64) -> Result<usize> {
        Err(EmbedFsError::NotImplemented("read_at"))
    }

    fn seek(&mut self, _pos: SeekFrom) -> Result<u64> {
        Err(EmbedFsError::NotImplemented("seek"))
    }

    fn stat(&self) -> Result<Entry> {
        Err(EmbedFsError::NotImplemented("stat"))
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize> {
        Err(EmbedFsError::NotAvailable)
    }

    fn truncate(&mut self, _len: u64) -> Result<()> {
        Err(EmbedFsError::NotAvailable)
    }

    // The store belongs to the container; dropping the borrow is all there is
    fn close(self) -> Result<()> {
        Ok(())
    }
}

impl<S: Store> io::Read for BoundedReader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_bounded(buf).map_err(|e| match e {
            EmbedFsError::Io(io) => io,
            other => io::Error::other(other),
        })
    }
}
