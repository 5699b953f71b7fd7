//! Embedded read-only filesystem appended to binary blobs
//!
#![allow(clippy::cast_possible_truncation)] // Offsets are bounded by store sizes
#![allow(clippy::doc_markdown)] // Format names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
//! This crate appends an archive of files to the end of an arbitrary blob,
//! typically an executable, and later serves those files back from the same
//! blob without extracting them.
//!
//! # Container Layout
//!
//! ```text
//! +----------------+-----------------------------+-----------------------+
//! | host bytes     | tar stream (ustar entries)  | trailer (20 bytes)    |
//! |                | + end-of-archive blocks     | "EMBEDFS~000:" + i64  |
//! +----------------+-----------------------------+-----------------------+
//! 0                archive_offset                size - 20          size
//! ```
//!
//! The trailer's big-endian offset points back at the start of the tar
//! stream. Entry names are absolute paths such as `/assets/logo.png`.
//!
//! # Components
//!
//! - [`Embedder`]: appends entries and seals the archive with a trailer
//! - [`Container`]: validates the trailer and indexes entries by name
//! - [`BoundedReader`]: reads one entry's byte range from the store
//! - [`truncate()`]: strips the archive, restoring the original blob
//!
//! # Example
//!
//! ```rust
//! use embedfs::{Container, Embedder, MemoryStore};
//! use std::io::Read;
//!
//! let mut embedder = Embedder::create(MemoryStore::with_contents(b"#!host".to_vec()))?;
//! embedder.embed_reader("/a/1", 1, &b"x"[..])?;
//! embedder.embed_reader("/b/2", 1, &b"y"[..])?;
//! embedder.close()?;
//!
//! let container = Container::open(embedder.into_inner()?)?;
//! assert_eq!(container.list_dir("/"), vec!["/a/1", "/b/2"]);
//!
//! let mut content = String::new();
//! container.open_file("/a/1")?.read_to_string(&mut content)?;
//! assert_eq!(content, "x");
//! assert!(!container.is_file_exist("/c/3"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod container;
pub mod embedder;
pub mod error;
pub mod header;
pub mod path;
pub mod reader;
pub mod store;
pub mod trailer;
mod truncate;

pub use container::{Container, Entry, locate};
pub use embedder::Embedder;
pub use error::{EmbedFsError, Result};
pub use reader::{BoundedReader, EmbeddedFile};
pub use store::{MemoryStore, Store};
pub use trailer::{SIGNATURE, TRAILER_SIZE, Trailer};
pub use truncate::truncate;
