//! Appending an archive to a container
//!
//! The embedder writes a tar stream starting at the store's current
//! position, then seals it with a [`Trailer`] pointing back at that
//! position. Until [`Embedder::close`] succeeds the container has no
//! trailer and is not readable.
//!
//! ```rust
//! use embedfs::{Container, Embedder, MemoryStore};
//!
//! let store = MemoryStore::with_contents(b"host binary".to_vec());
//! let mut embedder = Embedder::create(store)?;
//! embedder.embed_reader("greeting.txt", 5, &b"hello"[..])?;
//! let store = embedder.into_inner()?;
//!
//! let container = Container::open(store)?;
//! assert!(container.is_file_exist("/greeting.txt"));
//! # Ok::<(), embedfs::EmbedFsError>(())
//! ```

use std::fs::{self, File};
use std::io::{self, Read, SeekFrom, Write};
use std::path::{Component, Path};

use tar::Builder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{EmbedFsError, Result};
use crate::header::append_entry;
use crate::path;
use crate::store::Store;
use crate::trailer::Trailer;

enum State<S: Write> {
    Writing(Builder<S>),
    Closed(S),
}

/// Write-side handle appending entries to a container
///
/// The handle moves from writing to closed exactly once. Entries added after
/// closing fail with [`EmbedFsError::NotAvailable`].
pub struct Embedder<S: Store> {
    /// `None` only after a failed close, which leaves the store unusable
    state: Option<State<S>>,
    archive_start: u64,
    entry_count: usize,
}

impl<S: Store> Embedder<S> {
    /// Start an archive at the current position of `store`
    pub fn create(mut store: S) -> Result<Self> {
        let archive_start = store.stream_position()?;
        debug!("Starting embedded archive at offset {}", archive_start);

        Ok(Self {
            state: Some(State::Writing(Builder::new(store))),
            archive_start,
            entry_count: 0,
        })
    }

    /// Offset where the archive begins
    pub fn archive_start(&self) -> u64 {
        self.archive_start
    }

    /// Number of entries written so far
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Whether the archive has been sealed
    pub fn is_closed(&self) -> bool {
        !matches!(self.state, Some(State::Writing(_)))
    }

    /// Embed the file at `source` under the name `target`
    ///
    /// `target` is normalized to an absolute path. A failure leaves no bytes
    /// of the entry behind and the embedder ready for the next one.
    pub fn embed_file(&mut self, source: impl AsRef<Path>, target: &str) -> Result<()> {
        let source = source.as_ref();
        let builder = self.builder()?;

        let metadata = fs::metadata(source)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", source.display()),
            )
            .into());
        }

        let name = path::normalize(target);
        let file = File::open(source)?;
        append_or_rollback(builder, |builder| {
            append_entry(builder, &name, metadata.len(), Some(&metadata), file)
        })?;

        self.entry_count += 1;
        debug!(
            "Embedded {} as {} ({} bytes)",
            source.display(),
            name,
            metadata.len()
        );
        Ok(())
    }

    /// Embed `size` bytes read from `data` under the name `target`
    pub fn embed_reader<R: Read>(&mut self, target: &str, size: u64, data: R) -> Result<()> {
        let builder = self.builder()?;

        let name = path::normalize(target);
        append_or_rollback(builder, |builder| append_entry(builder, &name, size, None, data))?;

        self.entry_count += 1;
        debug!("Embedded {} ({} bytes)", name, size);
        Ok(())
    }

    /// Embed every regular file below `root`, named `prefix` + relative path
    ///
    /// Directories themselves are not recorded. Files are visited in
    /// file-name order. Returns the number of files embedded.
    pub fn embed_directory(&mut self, root: impl AsRef<Path>, prefix: &str) -> Result<usize> {
        let root = root.as_ref();
        let mut embedded = 0;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() {
                continue;
            }

            let relative = relative_name(entry.path(), root);
            self.embed_file(entry.path(), &path::join(prefix, &relative))?;
            embedded += 1;
        }

        debug!(
            "Embedded {} files from {} under {}",
            embedded,
            root.display(),
            prefix
        );
        Ok(embedded)
    }

    /// Finish the archive stream and write the trailer
    ///
    /// The embedder is terminal afterwards; closing twice fails with
    /// [`EmbedFsError::NotAvailable`].
    pub fn close(&mut self) -> Result<()> {
        let builder = match self.state.take() {
            Some(State::Writing(builder)) => builder,
            other => {
                self.state = other;
                return Err(EmbedFsError::NotAvailable);
            }
        };

        let mut store = builder.into_inner()?;
        let archive_offset = i64::try_from(self.archive_start).map_err(|_| {
            EmbedFsError::InvalidFormat(format!(
                "archive offset {} does not fit the trailer",
                self.archive_start
            ))
        })?;
        Trailer::new(archive_offset).write_to(&mut store)?;
        store.flush()?;

        info!(
            "Sealed embedded archive with {} entries at offset {}",
            self.entry_count, self.archive_start
        );
        self.state = Some(State::Closed(store));
        Ok(())
    }

    /// Close if still writing and hand back the store
    pub fn into_inner(mut self) -> Result<S> {
        if !self.is_closed() {
            self.close()?;
        }
        match self.state.take() {
            Some(State::Closed(store)) => Ok(store),
            _ => Err(EmbedFsError::NotAvailable),
        }
    }

    fn builder(&mut self) -> Result<&mut Builder<S>> {
        match self.state.as_mut() {
            Some(State::Writing(builder)) => Ok(builder),
            _ => Err(EmbedFsError::NotAvailable),
        }
    }
}

/// Run `append`, cutting the store back to where it started on failure
fn append_or_rollback<S, F>(builder: &mut Builder<S>, append: F) -> Result<()>
where
    S: Store,
    F: FnOnce(&mut Builder<S>) -> io::Result<()>,
{
    let start = builder.get_mut().stream_position()?;
    let Err(error) = append(&mut *builder) else {
        return Ok(());
    };

    let store = builder.get_mut();
    store.seek(SeekFrom::Start(start))?;
    store.truncate(start)?;
    warn!("Discarded partial entry at offset {}: {}", start, error);
    Err(error.into())
}

/// Path of `path` below `root` with `/` separators
fn relative_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
