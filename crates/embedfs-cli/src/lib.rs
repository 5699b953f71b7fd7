//! Command-line front end for embedfs.
//!
//! The tool works on a container file, by default the running executable
//! itself, and dispatches to the embedfs core:
//! - `embed`: copy the container and append an archive of files to the copy
//! - `list`: print embedded file names
//! - `cat`: print one embedded file
//! - `truncate`: copy the container with the archive stripped
//! - `check`: report whether an archive is present
//!
//! # Example
//!
//! ```no_run
//! use embedfs_cli::{CliConfig, commands};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = CliConfig::from_args();
//!     config.validate()?;
//!     commands::run(&config, &mut std::io::stdout().lock())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod commands;
pub mod config;
pub mod error;

pub use config::{CliConfig, Command};
pub use error::ConfigError;
