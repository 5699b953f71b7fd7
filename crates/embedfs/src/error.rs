//! Error types for embedded filesystem operations

use thiserror::Error;

/// Result type for embedded filesystem operations
pub type Result<T> = std::result::Result<T, EmbedFsError>;

/// Errors produced while embedding, opening, reading or truncating a container
#[derive(Debug, Error)]
pub enum EmbedFsError {
    /// Attempted mutation of a read-only container or a closed embedder
    #[error("not available, embedfs is read only file system")]
    NotAvailable,

    /// Lookup miss in the container index
    #[error("file is not exist: {0}")]
    NoExist(String),

    /// The container does not end with an embedfs trailer
    #[error("no embedfs footprint found")]
    NoFootprint,

    /// Trailer offset points outside of the container
    #[error("embedfs offset {offset} is out of bounds of file of size {size}")]
    InvalidOffset {
        /// Archive offset recorded in the trailer
        offset: i64,
        /// Size of the container in bytes
        size: u64,
    },

    /// Operation declared by the file interface but not supported
    #[error("not implemented yet: {0}")]
    NotImplemented(&'static str),

    /// Trailer bytes could not be decoded
    #[error("Invalid trailer format: {0}")]
    InvalidFormat(String),

    /// Underlying store failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EmbedFsError {
    /// Check if this error means the container carries no usable archive
    pub fn is_footprint_error(&self) -> bool {
        matches!(self, Self::NoFootprint | Self::InvalidOffset { .. })
    }
}

impl From<binrw::Error> for EmbedFsError {
    fn from(error: binrw::Error) -> Self {
        match error {
            binrw::Error::Io(io) => Self::Io(io),
            binrw::Error::AssertFail { message, .. } => Self::InvalidFormat(message),
            other => Self::InvalidFormat(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(EmbedFsError::NoFootprint.is_footprint_error());
        assert!(
            EmbedFsError::InvalidOffset {
                offset: 10,
                size: 5
            }
            .is_footprint_error()
        );
        assert!(!EmbedFsError::NotAvailable.is_footprint_error());
        assert!(!EmbedFsError::Io(std::io::ErrorKind::PermissionDenied.into()).is_footprint_error());
    }

    #[test]
    fn test_error_display() {
        let err = EmbedFsError::InvalidOffset {
            offset: 4096,
            size: 100,
        };
        let message = err.to_string();
        assert!(message.contains("4096"));
        assert!(message.contains("100"));

        assert_eq!(
            EmbedFsError::NoExist("/a/1".to_string()).to_string(),
            "file is not exist: /a/1"
        );
    }

    #[test]
    fn test_binrw_io_error_conversion() {
        let err: EmbedFsError = binrw::Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short",
        ))
        .into();
        assert!(matches!(err, EmbedFsError::Io(_)));
    }
}
