//! Command-line configuration.
//!
//! Configuration comes from CLI arguments with environment fallbacks:
//! - `--container` / `EMBEDFS_CONTAINER`: container to operate on, the
//!   running executable when unset
//! - `-v` (repeatable): log verbosity, overridden by `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use embedfs_cli::CliConfig;
//!
//! let config = CliConfig::from_args();
//! config.validate().expect("Invalid configuration");
//! println!("Container: {}", config.container_path().expect("container").display());
//! ```

use crate::error::ConfigError;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Tool configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "embedfs",
    about = "Embed files into executables and read them back",
    version
)]
pub struct CliConfig {
    /// Container to read (defaults to this executable)
    #[arg(long, global = true, env = "EMBEDFS_CONTAINER")]
    pub container: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Operations on a container.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Copy the container to TARGET and embed FILEs into the copy
    Embed {
        /// Output file
        target: PathBuf,

        /// Files or directories to embed, named by their given paths
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Name prefix for embedded entries
        #[arg(long, default_value = "/")]
        prefix: String,
    },

    /// List embedded files whose names start with DIR
    List {
        /// Name prefix to filter on
        #[arg(default_value = "/")]
        dir: String,
    },

    /// Print the contents of an embedded file to stdout
    Cat {
        /// Name of the embedded file
        file: String,
    },

    /// Copy the container to TARGET with the embedded archive removed
    Truncate {
        /// Output file
        target: PathBuf,
    },

    /// Report whether the container carries an embedded archive
    Check,
}

impl CliConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Path of the container to operate on.
    pub fn container_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.container {
            Some(path) => Ok(path.clone()),
            None => std::env::current_exe().map_err(ConfigError::CurrentExe),
        }
    }

    /// Default log filter for the requested verbosity.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the container cannot be located or an output
    /// target would overwrite it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let container = self.container_path()?;
        if !container.is_file() {
            return Err(ConfigError::ContainerNotFound(container));
        }

        if let Command::Embed { target, .. } | Command::Truncate { target } = &self.command {
            let same = match (container.canonicalize(), target.canonicalize()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            };
            if same {
                return Err(ConfigError::TargetIsContainer(target.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_embed() {
        let config =
            CliConfig::try_parse_from(["embedfs", "embed", "out.bin", "a.txt", "assets"]).unwrap();

        assert_eq!(
            config.command,
            Command::Embed {
                target: PathBuf::from("out.bin"),
                files: vec![PathBuf::from("a.txt"), PathBuf::from("assets")],
                prefix: "/".to_string(),
            }
        );
        assert_eq!(config.verbose, 0);
    }

    #[test]
    fn test_embed_requires_files() {
        assert!(CliConfig::try_parse_from(["embedfs", "embed", "out.bin"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let config =
            CliConfig::try_parse_from(["embedfs", "list", "--container", "app", "-vv"]).unwrap();

        assert_eq!(config.container, Some(PathBuf::from("app")));
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(
            config.command,
            Command::List {
                dir: "/".to_string()
            }
        );
    }

    #[test]
    fn test_validate_missing_container() {
        let config = CliConfig::try_parse_from([
            "embedfs",
            "--container",
            "/nonexistent/embedfs/container",
            "check",
        ])
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ContainerNotFound(_))
        ));
    }

    #[test]
    fn test_validate_target_is_container() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let config = CliConfig {
            container: Some(path.clone()),
            verbose: 0,
            command: Command::Truncate {
                target: path.clone(),
            },
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::TargetIsContainer(_))
        ));
    }
}
