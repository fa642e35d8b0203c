//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file (or not at
//! all). One-shot runs such as `--export` log to stderr. `RUST_LOG`
//! overrides the default filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "pairwatch=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Append logs to the file at `path`, creating it if needed.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))
}

/// Log to stderr.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))
}
