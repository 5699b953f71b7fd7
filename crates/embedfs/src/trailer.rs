//! Trailer record locating the embedded archive
//!
//! The trailer is a 20-byte big-endian structure written as the very last
//! bytes of a container:
//! - 12-byte signature "EMBEDFS~000:" (format identity and version)
//! - 8-byte signed absolute offset of the archive start

use std::io::{Cursor, Read, Seek, Write};

use binrw::{BinRead, BinWrite};

use crate::error::{EmbedFsError, Result};

/// Length of the format signature
pub const SIGNATURE_LEN: usize = 12;

/// Format signature, "EMBEDFS~" followed by the format version
pub const SIGNATURE: [u8; SIGNATURE_LEN] = *b"EMBEDFS~000:";

/// Total trailer size in bytes
pub const TRAILER_SIZE: usize = SIGNATURE_LEN + 8;

/// Tail-anchored record identifying a container and locating its archive
///
/// Range validation of `archive_offset` is left to the opener; decoding only
/// checks the signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(big)]
pub struct Trailer {
    /// Format signature, must equal [`SIGNATURE`]
    #[br(assert(signature == SIGNATURE, "signature mismatch: {:02x?}", signature))]
    pub signature: [u8; SIGNATURE_LEN],

    /// Absolute offset where the embedded archive begins
    pub archive_offset: i64,
}

impl Trailer {
    /// Create a trailer pointing at `archive_offset`
    pub fn new(archive_offset: i64) -> Self {
        Self {
            signature: SIGNATURE,
            archive_offset,
        }
    }

    /// Serialize to the on-disk representation
    pub fn encode(&self) -> [u8; TRAILER_SIZE] {
        let mut bytes = [0u8; TRAILER_SIZE];
        bytes[..SIGNATURE_LEN].copy_from_slice(&self.signature);
        bytes[SIGNATURE_LEN..].copy_from_slice(&self.archive_offset.to_be_bytes());
        bytes
    }

    /// Parse from the on-disk representation
    ///
    /// Fails with [`EmbedFsError::InvalidFormat`] when the signature does not
    /// match exactly.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < TRAILER_SIZE {
            return Err(EmbedFsError::InvalidFormat(format!(
                "trailer needs {TRAILER_SIZE} bytes, got {}",
                data.len()
            )));
        }
        Self::read_from(&mut Cursor::new(data))
    }

    /// Read a trailer from the current position of `reader`
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Ok(Self::read(reader)?)
    }

    /// Write the trailer at the current position of `writer`
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.write(writer)?;
        Ok(())
    }
}
