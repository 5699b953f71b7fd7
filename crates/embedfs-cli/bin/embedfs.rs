//! embedfs binary entry point.
//!
//! This is a thin wrapper around the embedfs-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates configuration
//! 4. Runs the requested command
//!
//! Errors are reported on stderr and end the process with a non-zero status.

use anyhow::Result;
use embedfs_cli::{CliConfig, commands};

fn main() -> Result<()> {
    let config = CliConfig::from_args();

    // RUST_LOG takes precedence over -v flags
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&config, &mut out)?;

    Ok(())
}
