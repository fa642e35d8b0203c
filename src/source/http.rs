//! HTTP data source.
//!
//! Polls the backend's `/api/monitor` endpoint from a background task.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::wire::MonitorResponse;
use super::{normalize_prefix, DataSource};
use crate::data::MonitorRecord;
use crate::error::SourceError;

/// Client for a single monitor backend.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use pairwatch::MonitorClient;
///
/// # tokio_test::block_on(async {
/// let client = MonitorClient::new("http://localhost:8888", Duration::from_secs(5)).unwrap();
/// let records = client.fetch("*").await.unwrap();
/// println!("{} monitors", records.len());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MonitorClient {
    client: Client,
    endpoint: String,
}

impl MonitorClient {
    /// Create a client for the backend at `endpoint` (scheme, host and port).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch every monitor whose key matches `prefix`.
    pub async fn fetch(&self, prefix: &str) -> Result<Vec<MonitorRecord>, SourceError> {
        let url = format!("{}/api/monitor", self.endpoint);

        let response = self
            .client
            .get(&url)
            .query(&[("prefix", prefix)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::Status(response.status().as_u16()));
        }

        let body: MonitorResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(body.into_records())
    }
}

/// A data source that polls the backend over HTTP.
///
/// A background task fetches on a fixed interval, and immediately after
/// a prefix change or a refresh request. Results are handed to the UI
/// thread through a channel; `poll()` never blocks.
///
/// Must be created from within a tokio runtime. Dropping the source stops
/// the background task.
#[derive(Debug)]
pub struct HttpSource {
    /// Fetch results tagged with the prefix they were fetched for.
    receiver: mpsc::Receiver<(String, Vec<MonitorRecord>)>,
    description: String,
    prefix: String,
    prefix_tx: watch::Sender<String>,
    refresh: Arc<Notify>,
    last_error: Arc<Mutex<Option<String>>>,
    task: JoinHandle<()>,
}

impl HttpSource {
    /// Spawn the polling task.
    pub fn spawn(client: MonitorClient, prefix: &str, interval: Duration) -> Self {
        let prefix = normalize_prefix(prefix);
        let (tx, rx) = mpsc::channel(4);
        let (prefix_tx, mut prefix_rx) = watch::channel(prefix.clone());
        let refresh = Arc::new(Notify::new());
        let last_error = Arc::new(Mutex::new(None));
        let description = format!("http: {}", client.endpoint());

        let notify = refresh.clone();
        let error_handle = last_error.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = notify.notified() => {}
                    changed = prefix_rx.changed() => {
                        if changed.is_err() {
                            // Source dropped
                            break;
                        }
                    }
                }

                let prefix = prefix_rx.borrow_and_update().clone();
                match client.fetch(&prefix).await {
                    Ok(records) => {
                        tracing::debug!(prefix = %prefix, count = records.len(), "fetched monitors");
                        set_error(&error_handle, None);
                        if tx.send((prefix, records)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(prefix = %prefix, error = %e, "monitor fetch failed");
                        set_error(&error_handle, Some(e.to_string()));
                    }
                }
                ticker.reset();
            }

            tracing::debug!("monitor polling stopped");
        });

        Self {
            receiver: rx,
            description,
            prefix,
            prefix_tx,
            refresh,
            last_error,
            task,
        }
    }
}

fn set_error(slot: &Mutex<Option<String>>, value: Option<String>) {
    if let Ok(mut guard) = slot.lock() {
        *guard = value;
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<Vec<MonitorRecord>> {
        let mut latest = None;

        // Drain to the most recent fetch for the current prefix
        loop {
            match self.receiver.try_recv() {
                Ok((prefix, records)) if prefix == self.prefix => latest = Some(records),
                Ok((prefix, _)) => {
                    tracing::debug!(prefix = %prefix, "dropping result for previous prefix");
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    set_error(&self.last_error, Some("Polling task stopped".to_string()));
                    break;
                }
            }
        }

        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.prefix = normalize_prefix(prefix);
        tracing::info!(prefix = %self.prefix, "prefix changed");
        // Wakes the task even when the prefix is unchanged
        self.prefix_tx.send_replace(self.prefix.clone());
    }

    fn refresh(&mut self) {
        self.refresh.notify_one();
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}
