//! Archive entry headers
//!
//! Entries are written as ustar records whose names are absolute paths. Tar
//! libraries refuse absolute names through their path setters, so the name
//! bytes are placed into the header fields directly:
//!
//! ```text
//! len(name) <= 100                  -> name field
//! split at '/' into <=155 / <=100   -> prefix + name fields
//! otherwise                         -> PAX "path" record before the entry
//! ```

use std::fs::Metadata;
use std::io::{self, Read, Write};

use tar::{Builder, EntryType, Header, HeaderMode};

/// Capacity of the ustar `name` field
pub const NAME_FIELD_LEN: usize = 100;

/// Capacity of the ustar `prefix` field
pub const PREFIX_FIELD_LEN: usize = 155;

/// Permission bits used for entries that do not come from a file
const DEFAULT_MODE: u32 = 0o644;

/// Where an entry name is stored inside its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameLayout<'a> {
    /// Whole name fits the `name` field
    Name(&'a [u8]),
    /// Name split across the `prefix` and `name` fields at a separator
    Split {
        /// Leading part, stored without the separator
        prefix: &'a [u8],
        /// Trailing part after the separator
        name: &'a [u8],
    },
    /// Name carried by a PAX extended header
    Pax,
}

impl<'a> NameLayout<'a> {
    /// Choose how to store `name`
    pub fn for_name(name: &'a [u8]) -> Self {
        if name.len() <= NAME_FIELD_LEN {
            return Self::Name(name);
        }

        // The first separator leaving a short enough tail gives the shortest
        // prefix; later separators only make the prefix longer.
        let split = name
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &b)| b == b'/')
            .map(|(i, _)| i)
            .find(|&i| name.len() - i - 1 <= NAME_FIELD_LEN);

        match split {
            Some(i) if i <= PREFIX_FIELD_LEN && i + 1 < name.len() => Self::Split {
                prefix: &name[..i],
                name: &name[i + 1..],
            },
            _ => Self::Pax,
        }
    }
}

/// Append one regular-file entry named `name` holding `size` bytes from `data`
///
/// When `metadata` is given, mode, owner and modification time are copied
/// from it. Fails with `UnexpectedEof` when `data` ends before `size` bytes.
pub fn append_entry<W: Write, R: Read>(
    builder: &mut Builder<W>,
    name: &str,
    size: u64,
    metadata: Option<&Metadata>,
    data: R,
) -> io::Result<()> {
    let mut header = Header::new_ustar();
    match metadata {
        Some(metadata) => header.set_metadata_in_mode(metadata, HeaderMode::Complete),
        None => {
            header.set_mode(DEFAULT_MODE);
            header.set_mtime(0);
        }
    }
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);

    let bytes = name.as_bytes();
    let layout = NameLayout::for_name(bytes);
    if layout == NameLayout::Pax {
        builder.append_pax_extensions([("path", bytes)])?;
    }
    write_name(&mut header, layout, bytes)?;
    header.set_cksum();

    let mut counted = CountingReader::new(data.take(size));
    builder.append(&header, &mut counted)?;

    if counted.count < size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "source for {name} ended after {} of {size} bytes",
                counted.count
            ),
        ));
    }
    Ok(())
}

fn write_name(header: &mut Header, layout: NameLayout<'_>, full: &[u8]) -> io::Result<()> {
    let ustar = header
        .as_ustar_mut()
        .ok_or_else(|| io::Error::other("header is not in ustar format"))?;

    match layout {
        NameLayout::Name(name) => copy_field(&mut ustar.name, name),
        NameLayout::Split { prefix, name } => {
            copy_field(&mut ustar.prefix, prefix);
            copy_field(&mut ustar.name, name);
        }
        // Readers that skip PAX records still see a recognizable name
        NameLayout::Pax => copy_field(&mut ustar.name, &full[..NAME_FIELD_LEN]),
    }
    Ok(())
}

fn copy_field(field: &mut [u8], value: &[u8]) {
    field.fill(0);
    field[..value.len()].copy_from_slice(value);
}

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
