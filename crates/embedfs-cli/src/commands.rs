//! Command implementations.
//!
//! Each command opens its own handles on the container so that reading the
//! running executable never conflicts with writing an output copy.

use anyhow::{Context, Result};
use embedfs::{Container, Embedder, path};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{CliConfig, Command};

/// Run the configured command, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error describing the first failure; the caller reports it and
/// exits with a non-zero status.
pub fn run(config: &CliConfig, out: &mut impl Write) -> Result<()> {
    let container = config.container_path()?;

    match &config.command {
        Command::Embed {
            target,
            files,
            prefix,
        } => {
            let embedded = embed(&container, target, files, prefix)?;
            info!("Embedded {} files into {}", embedded, target.display());
        }
        Command::List { dir } => list(&container, dir, out)?,
        Command::Cat { file } => cat(&container, file, out)?,
        Command::Truncate { target } => {
            let length = truncate(&container, target)?;
            info!("Wrote {} bytes to {}", length, target.display());
        }
        Command::Check => {
            check(&container, out)?;
        }
    }

    Ok(())
}

/// Copy `container` to `target` and embed `files` into the copy.
///
/// Directories are embedded recursively. Entries are named by the paths as
/// given, below `prefix`. A file that cannot be embedded is reported and
/// skipped. Returns the number of files embedded.
pub fn embed(container: &Path, target: &Path, files: &[impl AsRef<Path>], prefix: &str) -> Result<usize> {
    let output = copy_container(container, target)?;
    let mut embedder = Embedder::create(output)
        .with_context(|| format!("can't create embedfs on <{}>", target.display()))?;

    let mut embedded = 0;
    for file in files {
        let file = file.as_ref();
        let name = path::join(prefix, &file.to_string_lossy());

        let result = if file.is_dir() {
            embedder.embed_directory(file, &name)
        } else {
            embedder.embed_file(file, &name).map(|()| 1)
        };

        match result {
            Ok(count) => embedded += count,
            Err(e) => warn!(
                "can't embed file <{}> into <{}>: {}",
                file.display(),
                target.display(),
                e
            ),
        }
    }

    embedder
        .close()
        .with_context(|| format!("can't finish embedfs on <{}>", target.display()))?;
    Ok(embedded)
}

/// Print the names below `dir`, one per line.
pub fn list(container: &Path, dir: &str, out: &mut impl Write) -> Result<()> {
    let fs = open(container)?;
    for name in fs.list_dir(dir) {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

/// Copy the contents of the embedded file `name` to `out`.
pub fn cat(container: &Path, name: &str, out: &mut impl Write) -> Result<()> {
    let fs = open(container)?;
    let mut file = fs
        .open_file(name)
        .with_context(|| format!("can't open file <{name}> in embedfs"))?;
    io::copy(&mut file, out).with_context(|| format!("can't read file <{name}> from embedfs"))?;
    Ok(())
}

/// Write a copy of `container` without its embedded archive to `target`.
///
/// Returns the length of the written file.
pub fn truncate(container: &Path, target: &Path) -> Result<u64> {
    let mut output = copy_container(container, target)?;
    embedfs::truncate(&mut output).context("can't truncate embedfs")
}

/// Report whether `container` carries an embedded archive.
///
/// A missing or out-of-range trailer is reported on `out`; I/O failures are
/// returned as errors.
pub fn check(container: &Path, out: &mut impl Write) -> Result<bool> {
    let mut file = File::open(container)
        .with_context(|| format!("can't open <{}> for reading", container.display()))?;

    match embedfs::locate(&mut file) {
        Ok(offset) => {
            debug!("Found embedded archive at offset {}", offset);
            writeln!(
                out,
                "<{}> contains embedded fs; use list to list files.",
                container.display()
            )?;
            Ok(true)
        }
        Err(e) if e.is_footprint_error() => {
            debug!("No embedded archive: {}", e);
            writeln!(out, "<{}> doesn't contain embedded fs.", container.display())?;
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("can't check <{}>", container.display())),
    }
}

fn open(container: &Path) -> Result<Container<File>> {
    let file = File::open(container)
        .with_context(|| format!("can't open <{}> for reading", container.display()))?;
    Container::open(file).context("can't open embedfs")
}

/// Copy `container` byte for byte into a fresh executable `target`,
/// returning a read-write handle positioned at its end.
fn copy_container(container: &Path, target: &Path) -> Result<File> {
    let mut output = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(target)
        .with_context(|| format!("can't open <{}> for writing", target.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(target, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("can't chmod <{}> to 0700", target.display()))?;
    }

    let mut source = File::open(container)
        .with_context(|| format!("can't open <{}> for reading", container.display()))?;
    io::copy(&mut source, &mut output)
        .with_context(|| format!("can't copy <{}> to <{}>", container.display(), target.display()))?;

    Ok(output)
}
