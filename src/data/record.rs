//! Monitor records as delivered by a data source.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Side of a monitored position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Buy-side: triggers when the bid drops below the monitor price.
    Long,
    /// Sell-side: triggers when the ask rises above the monitor price.
    Short,
    /// Anything the backend sent that is neither `long` nor `short`.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Direction {
    /// Returns the display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
            Direction::Unknown => "?",
        }
    }
}

/// A snapshot of one monitored pair: the registered trigger price next to
/// the latest market quotes.
///
/// Records are immutable once fetched. A new fetch replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorRecord {
    pub pair: String,
    pub direction: Direction,
    /// Price at which monitoring was registered.
    pub monitor_price: f64,
    /// When monitoring was registered, in local wall-clock time.
    pub monitor_timestamp: Option<NaiveDateTime>,
    pub current_ask_price: f64,
    pub current_bid_price: f64,
    /// Latest close price; the price diff is measured against this.
    pub current_close: f64,
    /// Remaining validity in seconds. Negative when the backend key has no expiry.
    pub ttl_seconds: f64,
}

impl MonitorRecord {
    /// Create a record with the given pair, direction and prices.
    ///
    /// Ask and bid default to the close price, the timestamp to `None`
    /// and the TTL to zero.
    pub fn new(pair: &str, direction: Direction, monitor_price: f64, current_close: f64) -> Self {
        Self {
            pair: pair.to_string(),
            direction,
            monitor_price,
            monitor_timestamp: None,
            current_ask_price: current_close,
            current_bid_price: current_close,
            current_close,
            ttl_seconds: 0.0,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: f64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn with_quotes(mut self, ask: f64, bid: f64) -> Self {
        self.current_ask_price = ask;
        self.current_bid_price = bid;
        self
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.monitor_timestamp = Some(timestamp);
        self
    }
}
