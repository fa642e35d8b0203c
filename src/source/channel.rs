//! Channel-based data source.
//!
//! Receives monitor records via a tokio watch channel.
//! This is useful when another component in the same process already
//! fetches the records and pushes them rather than having them polled.

use tokio::sync::watch;

use super::{normalize_prefix, DataSource, MATCH_ALL};
use crate::data::MonitorRecord;

/// A data source that receives monitor records via a channel.
///
/// The producer owns fetching and filtering; the prefix set on this
/// source is only recorded for display.
///
/// # Example
///
/// ```
/// use pairwatch::ChannelSource;
///
/// // Create a channel pair
/// let (tx, source) = ChannelSource::create("embedded");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Vec<MonitorRecord>>,
    description: String,
    prefix: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source.
    ///
    /// # Arguments
    ///
    /// * `receiver` - The receiving end of a watch channel
    /// * `source_description` - A description of where records come from
    pub fn new(receiver: watch::Receiver<Vec<MonitorRecord>>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            prefix: MATCH_ALL.to_string(),
            initial_returned: false,
        }
    }

    /// Create a channel pair for sending records to a ChannelSource.
    ///
    /// Returns (sender, source) where the sender can be used to push
    /// record sets and the source can be handed to the TUI.
    pub fn create(source_description: &str) -> (watch::Sender<Vec<MonitorRecord>>, Self) {
        let (tx, rx) = watch::channel(Vec::new());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<Vec<MonitorRecord>> {
        // Return the initial value on first poll
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        // Check if there's a new value without blocking
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        // Fetch errors belong to the producer
        None
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = normalize_prefix(prefix);
    }

    fn refresh(&mut self) {
        self.receiver.mark_changed();
    }
}
