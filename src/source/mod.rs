//! Data source abstraction for receiving monitor records.
//!
//! This module provides a trait-based abstraction for fetching monitor
//! records from various sources (the HTTP backend, a JSON file, an
//! in-memory channel).

mod channel;
mod file;
mod http;
pub mod wire;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::{HttpSource, MonitorClient};
pub use wire::{MonitorResponse, PairData, PairMonitorData, PairMonitorDetail};

use std::fmt::Debug;

use crate::data::MonitorRecord;

/// Prefix that matches every pair.
pub const MATCH_ALL: &str = "*";

/// Normalize a user-entered prefix: blank input means "all pairs".
pub fn normalize_prefix(prefix: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        MATCH_ALL.to_string()
    } else {
        prefix.to_string()
    }
}

/// Trait for receiving monitor records from various sources.
///
/// Each successful fetch yields the complete record set for the current
/// prefix; it replaces whatever was fetched before.
///
/// # Example
///
/// ```
/// use pairwatch::{FileSource, DataSource};
///
/// let mut source = FileSource::new("monitor.json");
/// if let Some(records) = source.poll() {
///     println!("Got {} records", records.len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest fetch result.
    ///
    /// Returns `Some(records)` if a new fetch completed, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Vec<MonitorRecord>>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;

    /// Returns the error message of the last failed fetch, if the source
    /// has not recovered since.
    fn error(&self) -> Option<String>;

    /// The pair prefix currently requested.
    fn prefix(&self) -> &str;

    /// Change the pair prefix and fetch again as soon as possible.
    ///
    /// Blank input resets to [`MATCH_ALL`].
    fn set_prefix(&mut self, prefix: &str);

    /// Request a fetch with the current prefix as soon as possible.
    fn refresh(&mut self);
}
