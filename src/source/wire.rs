//! Wire format of the monitor endpoint.
//!
//! `GET /api/monitor?prefix=...` answers with a JSON object whose `data`
//! field lists one entry per monitored pair: the registered monitor, the
//! latest quote for that pair, and the remaining TTL of the monitor entry.

use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::data::{Direction, MonitorRecord};

/// Top-level response body.
///
/// The backend sends `"data": null` when nothing matches the prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorResponse {
    #[serde(default)]
    pub data: Option<Vec<PairMonitorDetail>>,
}

impl MonitorResponse {
    /// Convert the response into monitor records, preserving order.
    pub fn into_records(self) -> Vec<MonitorRecord> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(MonitorRecord::from)
            .collect()
    }
}

/// One monitored pair as sent by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairMonitorDetail {
    #[serde(default)]
    pub pair_data: PairData,
    #[serde(default)]
    pub pair_monitor_data: PairMonitorData,
    /// Remaining TTL of the monitor entry, in seconds.
    #[serde(default)]
    pub ttl: f64,
}

/// Latest quote for a pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub pair: String,
    #[serde(default)]
    pub bid_price: f64,
    #[serde(default)]
    pub ask_price: f64,
    #[serde(default)]
    pub close: f64,
}

/// A registered monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairMonitorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default)]
    pub pair: String,
    #[serde(default)]
    pub direct: Direction,
    #[serde(default)]
    pub price: f64,
}

/// A timestamp as it appears on the wire: epoch milliseconds or text.
///
/// Any other JSON value is kept as-is so one odd record does not fail the
/// whole response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
    Other(serde_json::Value),
}

impl RawTimestamp {
    /// Resolve to local wall-clock time.
    ///
    /// Accepts epoch milliseconds, `YYYY-MM-DD HH:MM:SS` (already local)
    /// and RFC 3339. Anything else resolves to `None`.
    pub fn to_local(&self) -> Option<NaiveDateTime> {
        match self {
            RawTimestamp::Other(_) => None,
            RawTimestamp::Millis(ms) => {
                DateTime::from_timestamp_millis(*ms).map(|t| t.with_timezone(&Local).naive_local())
            }
            RawTimestamp::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                NaiveDateTime::parse_from_str(text, crate::data::format::TIMESTAMP_FORMAT)
                    .ok()
                    .or_else(|| {
                        DateTime::parse_from_rfc3339(text)
                            .ok()
                            .map(|t| t.with_timezone(&Local).naive_local())
                    })
            }
        }
    }
}

impl From<PairMonitorDetail> for MonitorRecord {
    fn from(detail: PairMonitorDetail) -> Self {
        let monitor = detail.pair_monitor_data;
        let quote = detail.pair_data;
        MonitorRecord {
            monitor_timestamp: monitor.timestamp.as_ref().and_then(RawTimestamp::to_local),
            pair: monitor.pair,
            direction: monitor.direct,
            monitor_price: monitor.price,
            current_ask_price: quote.ask_price,
            current_bid_price: quote.bid_price,
            current_close: quote.close,
            ttl_seconds: detail.ttl,
        }
    }
}
