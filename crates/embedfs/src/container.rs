//! Opening a container and indexing its embedded archive
//!
//! Opening reads the trailer from the tail of the store, checks that the
//! archive offset lies inside the store, then replays the tar stream once to
//! record where each entry's content lives. Entry content is never loaded
//! into memory; [`Container::open_file`] hands out readers over byte ranges
//! of the store.
//!
//! ```text
//! [host bytes ...][tar header][content][tar header][content]...[end blocks][trailer]
//!                 ^ archive_offset     ^ content_offset
//! ```

use std::collections::HashMap;
use std::io::SeekFrom;

use tar::Archive;
use tracing::{debug, info, warn};

use crate::error::{EmbedFsError, Result};
use crate::path;
use crate::reader::BoundedReader;
use crate::store::Store;
use crate::trailer::{TRAILER_SIZE, Trailer};

/// One embedded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Normalized absolute name
    pub name: String,
    /// Absolute offset of the first content byte in the container
    pub content_offset: u64,
    /// Content length in bytes
    pub content_length: u64,
}

/// Read-only view of an embedded archive
///
/// Built once by [`Container::open`] and never mutated afterwards. Every
/// mutating filesystem operation fails with [`EmbedFsError::NotAvailable`].
#[derive(Debug)]
pub struct Container<S: Store> {
    store: S,
    archive_offset: u64,
    /// Entries in replay order, including ones shadowed by a later name
    entries: Vec<Entry>,
    /// Name to position in `entries`; the last entry with a name wins
    index: HashMap<String, usize>,
}

/// Locate the embedded archive without indexing it
///
/// Reads the trailer and validates `0 <= archive_offset < size`. A store too
/// short to hold a trailer, or one whose tail does not carry the signature,
/// fails with [`EmbedFsError::NoFootprint`].
pub fn locate<S: Store>(store: &mut S) -> Result<u64> {
    let size = store.size()?;
    if size < TRAILER_SIZE as u64 {
        return Err(EmbedFsError::NoFootprint);
    }

    store.seek(SeekFrom::Start(size - TRAILER_SIZE as u64))?;
    let trailer = match Trailer::read_from(store) {
        Ok(trailer) => trailer,
        Err(EmbedFsError::InvalidFormat(_)) => return Err(EmbedFsError::NoFootprint),
        Err(e) => return Err(e),
    };

    match u64::try_from(trailer.archive_offset) {
        Ok(offset) if offset < size => Ok(offset),
        _ => Err(EmbedFsError::InvalidOffset {
            offset: trailer.archive_offset,
            size,
        }),
    }
}

impl<S: Store> Container<S> {
    /// Open the archive embedded in `store`
    ///
    /// Any failure, including a malformed entry in the middle of the archive,
    /// is returned as an error. Use [`Container::open_partial`] to keep the
    /// entries recovered before such a failure.
    pub fn open(store: S) -> Result<Self> {
        match Self::open_partial(store)? {
            (container, None) => Ok(container),
            (_, Some(error)) => Err(error),
        }
    }

    /// Open the archive embedded in `store`, keeping what replay recovered
    ///
    /// Trailer and offset failures are returned as errors. A failure while
    /// replaying the archive is returned next to a container indexing every
    /// entry read before it.
    pub fn open_partial(mut store: S) -> Result<(Self, Option<EmbedFsError>)> {
        let archive_offset = locate(&mut store)?;
        store.seek(SeekFrom::Start(archive_offset))?;

        let mut container = Self {
            store,
            archive_offset,
            entries: Vec::new(),
            index: HashMap::new(),
        };

        let replay_error = container.replay().err();
        match &replay_error {
            None => info!(
                "Opened embedded archive at offset {} with {} entries",
                archive_offset,
                container.entries.len()
            ),
            Some(e) => warn!(
                "Archive replay stopped after {} entries: {}",
                container.entries.len(),
                e
            ),
        }

        Ok((container, replay_error))
    }

    fn replay(&mut self) -> Result<()> {
        let mut archive = Archive::new(&mut self.store);

        for item in archive.entries_with_seek()? {
            let item = item?;
            let entry = Entry {
                name: path::normalize(&String::from_utf8_lossy(&item.path_bytes())),
                content_offset: self.archive_offset + item.raw_file_position(),
                content_length: item.size(),
            };
            debug!(
                "Indexed {} at offset {} ({} bytes)",
                entry.name, entry.content_offset, entry.content_length
            );

            if let Some(previous) = self.index.insert(entry.name.clone(), self.entries.len()) {
                warn!(
                    "Entry {} shadows an earlier entry with the same name at offset {}",
                    entry.name, self.entries[previous].content_offset
                );
            }
            self.entries.push(entry);
        }

        Ok(())
    }

    /// Offset where the archive begins, which is also the host blob length
    pub fn archive_offset(&self) -> u64 {
        self.archive_offset
    }

    /// All entries in the order they were embedded
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of replayed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry reachable under `path`
    pub fn entry(&self, path: &str) -> Option<&Entry> {
        self.index
            .get(&path::normalize(path))
            .map(|&position| &self.entries[position])
    }

    /// Names starting with the normalized `path`, in embedding order
    ///
    /// This is a literal prefix filter, not a directory listing: `/a`
    /// matches both `/a/1` and `/ab/2`.
    pub fn list_dir(&self, path: &str) -> Vec<String> {
        let prefix = path::normalize(path);
        self.entries
            .iter()
            .filter(|entry| entry.name.starts_with(&prefix))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Whether an entry exists under the normalized `path`
    pub fn is_file_exist(&self, path: &str) -> bool {
        self.index.contains_key(&path::normalize(path))
    }

    /// Open a reader over the content of the entry named `path`
    pub fn open_file(&self, path: &str) -> Result<BoundedReader<'_, S>> {
        let name = path::normalize(path);
        let entry = self
            .index
            .get(&name)
            .map(|&position| &self.entries[position])
            .ok_or(EmbedFsError::NoExist(name))?;

        Ok(BoundedReader::new(&self.store, entry))
    }

    /// Always fails: the container is read-only
    pub fn create_file(&self, _path: &str) -> Result<BoundedReader<'_, S>> {
        Err(EmbedFsError::NotAvailable)
    }

    /// Always fails: the container is read-only
    pub fn temp_file(&self) -> Result<BoundedReader<'_, S>> {
        Err(EmbedFsError::NotAvailable)
    }

    /// Always fails: the container is read-only
    pub fn move_file(&self, _from: &str, _to: &str) -> Result<()> {
        Err(EmbedFsError::NotAvailable)
    }

    /// Borrow the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }
}
