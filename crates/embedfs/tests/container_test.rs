//! Integration tests for embedding into and reading from real files

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use embedfs::{Container, EmbedFsError, Embedder, EmbeddedFile, MemoryStore, truncate};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Create a fake host executable and return an open read-write handle
/// positioned at its end.
fn create_host(dir: &Path, contents: &[u8]) -> File {
    let path = dir.join("host.bin");
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .expect("Failed to create host file");
    file.write_all(contents)
        .expect("Failed to write host contents");
    file
}

/// Populate a source tree with `/a/1` and `/b/2`.
fn create_tree(dir: &Path) {
    fs::create_dir_all(dir.join("a")).expect("Failed to create a/");
    fs::create_dir_all(dir.join("b")).expect("Failed to create b/");
    fs::write(dir.join("a/1"), "x").expect("Failed to write a/1");
    fs::write(dir.join("b/2"), "y").expect("Failed to write b/2");
}

/// Reader that hands out `remaining` bytes of filler and then fails.
struct FailingReader {
    remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("source went away"));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(b'z');
        self.remaining -= n;
        Ok(n)
    }
}

fn read_entry<S: embedfs::Store>(container: &Container<S>, name: &str) -> Vec<u8> {
    let mut content = Vec::new();
    container
        .open_file(name)
        .expect("Entry should exist")
        .read_to_end(&mut content)
        .expect("Entry should be readable");
    content
}

#[test]
fn test_create_empty_fs() {
    let dir = TempDir::new().unwrap();
    let host = create_host(dir.path(), b"la");

    let mut embedder = Embedder::create(host).unwrap();
    embedder.close().unwrap();

    let container = Container::open(embedder.into_inner().unwrap()).unwrap();
    assert!(container.is_empty());
    assert_eq!(container.archive_offset(), 2);
}

#[test]
fn test_embed_single_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("payload.txt");
    fs::write(&source, "embedded payload").unwrap();

    let mut embedder = Embedder::create(create_host(dir.path(), b"lala")).unwrap();
    embedder.embed_file(&source, "payload.txt").unwrap();
    let host = embedder.into_inner().unwrap();

    let container = Container::open(host).unwrap();
    assert!(container.is_file_exist("/payload.txt"));
    assert_eq!(read_entry(&container, "/payload.txt"), b"embedded payload");
}

#[test]
fn test_embed_directory() {
    let dir = TempDir::new().unwrap();
    let tree = dir.path().join("tree");
    create_tree(&tree);

    let mut embedder = Embedder::create(create_host(dir.path(), b"lala3")).unwrap();
    assert_eq!(embedder.embed_directory(&tree, "/").unwrap(), 2);
    embedder.close().unwrap();

    let container = Container::open(embedder.into_inner().unwrap()).unwrap();
    assert!(container.is_file_exist("/a/1"));
    assert!(container.is_file_exist("/b/2"));
    assert!(!container.is_file_exist("/c/3"));
    assert_eq!(container.list_dir("/"), vec!["/a/1", "/b/2"]);
    assert_eq!(read_entry(&container, "/a/1"), b"x");
    assert_eq!(read_entry(&container, "/b/2"), b"y");
}

#[test]
fn test_embed_directory_with_prefix() {
    let dir = TempDir::new().unwrap();
    let tree = dir.path().join("tree");
    create_tree(&tree);

    let mut embedder = Embedder::create(MemoryStore::new()).unwrap();
    embedder.embed_directory(&tree, "assets").unwrap();
    let container = Container::open(embedder.into_inner().unwrap()).unwrap();

    assert_eq!(container.list_dir("/assets"), vec!["/assets/a/1", "/assets/b/2"]);
    assert_eq!(container.list_dir("/assets/b"), vec!["/assets/b/2"]);
}

#[test]
fn test_reopen_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("host.bin");
    let tree = dir.path().join("tree");
    create_tree(&tree);

    {
        let mut embedder = Embedder::create(create_host(dir.path(), b"#!/bin/host")).unwrap();
        embedder.embed_directory(&tree, "/").unwrap();
        embedder.close().unwrap();
    }

    // Independent read-only handle over the same bytes
    let container = Container::open(File::open(&path).unwrap()).unwrap();
    let mut first = container.open_file("/a/1").unwrap();
    let mut second = container.open_file("/b/2").unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(EmbeddedFile::read(&mut second, &mut buf).unwrap(), 1);
    assert_eq!(buf[0], b'y');
    assert_eq!(EmbeddedFile::read(&mut first, &mut buf).unwrap(), 1);
    assert_eq!(buf[0], b'x');
}

#[test]
fn test_embed_zero_length_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("empty");
    fs::write(&source, b"").unwrap();

    let mut embedder = Embedder::create(MemoryStore::new()).unwrap();
    embedder.embed_file(&source, "/empty").unwrap();
    let container = Container::open(embedder.into_inner().unwrap()).unwrap();

    let reader = container.open_file("/empty").unwrap();
    assert!(reader.is_empty());
    assert_eq!(read_entry(&container, "/empty"), b"");
}

#[test]
fn test_open_without_trailer() {
    let dir = TempDir::new().unwrap();
    let host = create_host(dir.path(), &[0x7f; 4096]);

    assert!(matches!(
        Container::open(host),
        Err(EmbedFsError::NoFootprint)
    ));
}

#[test]
fn test_open_unclosed_embedder_has_no_footprint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("host.bin");

    let mut embedder = Embedder::create(create_host(dir.path(), b"host")).unwrap();
    embedder.embed_reader("/a", 1, &b"a"[..]).unwrap();

    // Not closed yet: the tail holds tar data, not a trailer
    let result = Container::open(File::open(&path).unwrap());
    assert!(matches!(result, Err(EmbedFsError::NoFootprint)));
    drop(embedder);
}

#[test]
fn test_truncate_file() {
    let dir = TempDir::new().unwrap();
    let host_bytes = b"\x7fELF\x02\x01\x01 pretend executable".to_vec();
    let tree = dir.path().join("tree");
    create_tree(&tree);

    let mut embedder = Embedder::create(create_host(dir.path(), &host_bytes)).unwrap();
    embedder.embed_directory(&tree, "/").unwrap();
    let mut host = embedder.into_inner().unwrap();

    assert_eq!(truncate(&mut host).unwrap(), host_bytes.len() as u64);

    let mut restored = Vec::new();
    host.seek(SeekFrom::Start(0)).unwrap();
    host.read_to_end(&mut restored).unwrap();
    assert_eq!(restored, host_bytes);

    assert!(matches!(truncate(&mut host), Err(EmbedFsError::NoFootprint)));
}

#[test]
fn test_embed_onto_truncated_container() {
    let mut embedder = Embedder::create(MemoryStore::with_contents(b"host".to_vec())).unwrap();
    embedder.embed_reader("/old", 3, &b"old"[..]).unwrap();
    let mut store = embedder.into_inner().unwrap();

    let end = truncate(&mut store).unwrap();
    store.seek(SeekFrom::Start(end)).unwrap();

    let mut embedder = Embedder::create(store).unwrap();
    embedder.embed_reader("/new", 3, &b"new"[..]).unwrap();
    let container = Container::open(embedder.into_inner().unwrap()).unwrap();

    assert_eq!(container.list_dir("/"), vec!["/new"]);
    assert_eq!(read_entry(&container, "/new"), b"new");
}

#[test]
fn test_failed_entry_keeps_later_entries_readable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("host.bin");
    let tree = dir.path().join("tree");
    create_tree(&tree);

    let mut embedder = Embedder::create(create_host(dir.path(), b"host")).unwrap();
    embedder.embed_file(tree.join("a/1"), "/a/1").unwrap();

    // Fails after more than a block of content has been written
    let err = embedder
        .embed_reader("/broken", 4096, FailingReader { remaining: 700 })
        .unwrap_err();
    assert!(matches!(err, EmbedFsError::Io(_)));

    embedder.embed_file(tree.join("b/2"), "/b/2").unwrap();
    embedder.close().unwrap();
    drop(embedder);

    let container = Container::open(File::open(&path).unwrap()).unwrap();
    assert_eq!(container.list_dir("/"), vec!["/a/1", "/b/2"]);
    assert!(!container.is_file_exist("/broken"));
    assert_eq!(read_entry(&container, "/a/1"), b"x");
    assert_eq!(read_entry(&container, "/b/2"), b"y");
}
