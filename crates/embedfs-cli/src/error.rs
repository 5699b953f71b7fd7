//! Error types for the command-line tool.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Container file does not exist
    #[error("container not found: {}", .0.display())]
    ContainerNotFound(PathBuf),

    /// Running executable could not be determined
    #[error("cannot determine current executable: {0}")]
    CurrentExe(#[source] std::io::Error),

    /// Output target is the container itself
    #[error("target {} is the container itself", .0.display())]
    TargetIsContainer(PathBuf),
}
