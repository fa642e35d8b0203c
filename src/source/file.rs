//! File-based data source.
//!
//! Polls a JSON file holding a saved `/api/monitor` response.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::wire::MonitorResponse;
use super::{normalize_prefix, DataSource, MATCH_ALL};
use crate::data::MonitorRecord;
use crate::error::SourceError;

/// A data source that reads monitor records from a JSON file.
///
/// Useful for replaying a captured backend response offline. The file
/// uses the same format as the HTTP endpoint.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated, or when a refresh or a
/// prefix change was requested. The prefix is applied locally, standing
/// in for the backend's key pattern match.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    prefix: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
    force_reload: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            prefix: MATCH_ALL.to_string(),
            last_error: None,
            last_modified: None,
            force_reload: false,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> Result<Vec<MonitorRecord>, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        let response: MonitorResponse = serde_json::from_str(&content)?;
        Ok(response
            .into_records()
            .into_iter()
            .filter(|r| matches_prefix(&r.pair, &self.prefix))
            .collect())
    }
}

/// Match a pair against a key pattern prefix.
///
/// Trailing `*` wildcards are ignored, so `BTC` and `BTC*` both match
/// every pair starting with `BTC`, and `*` matches everything.
pub fn matches_prefix(pair: &str, prefix: &str) -> bool {
    pair.starts_with(prefix.trim_end_matches('*'))
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Vec<MonitorRecord>> {
        let current_modified = self.get_modified_time();

        // Check if file has been modified since last read
        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, don't update
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed && !self.force_reload {
            return None;
        }
        self.force_reload = false;

        match self.read_file() {
            Ok(records) => {
                self.last_error = None;
                self.last_modified = current_modified;
                Some(records)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to load monitor file");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = normalize_prefix(prefix);
        self.force_reload = true;
    }

    fn refresh(&mut self) {
        self.force_reload = true;
    }
}
