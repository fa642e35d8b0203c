//! # pairwatch
//!
//! A terminal dashboard for price monitors on trading pairs.
//!
//! Each monitor pairs a registered trigger price with the latest market
//! quotes for a symbol. pairwatch fetches the monitor list from a backend
//! (or a JSON file), derives the distance between the current and the
//! monitor price, and shows the result in a sortable, auto-refreshing table
//! with long/short summary counts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(view model)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource     │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, selection, sorting and prefix editing
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for the HTTP backend, file polling and channel-based input
//! - **[`data`]**: Records and the table view model: derived fields, ordering and
//!   summary counts
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch the backend
//! pairwatch --endpoint http://127.0.0.1:8888
//!
//! # Only pairs starting with BTC, largest distance first
//! pairwatch --prefix BTC --sort priceDiff --descending
//!
//! # Watch a JSON file in the backend's response format
//! pairwatch --file monitors.json
//! ```
//!
//! ### As a library with the view model
//!
//! ```
//! use pairwatch::{derive_rows, sort_rows, Direction, MonitorRecord, SortDirective, SortField, SortDirection};
//!
//! let records = vec![
//!     MonitorRecord::new("BTCUSD", Direction::Long, 100.0, 110.0),
//!     MonitorRecord::new("ETHUSD", Direction::Short, 50.0, 50.0),
//! ];
//! let sort = SortDirective::new(SortField::PriceDiff, SortDirection::Descending);
//! let rows = sort_rows(&derive_rows(&records), Some(&sort));
//! assert_eq!(rows[0].record.pair, "BTCUSD");
//! assert_eq!(rows[0].price_diff_percent, 10.0);
//! ```
//!
//! ### As a library with the HTTP backend
//!
//! ```no_run
//! use std::time::Duration;
//! use pairwatch::{App, HttpSource, MonitorClient, SortDirective};
//!
//! # tokio_test::block_on(async {
//! let client = MonitorClient::new("http://127.0.0.1:8888", Duration::from_secs(10)).unwrap();
//! let source = HttpSource::spawn(client, "*", Duration::from_secs(5));
//! let app = App::new(Box::new(source), SortDirective::default());
//! # });
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use pairwatch::{App, ChannelSource, SortDirective};
//!
//! // Create a channel for pushing record sets
//! let (tx, source) = ChannelSource::create("embedded");
//!
//! let app = App::new(Box::new(source), SortDirective::default());
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod export;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    compute_aggregates, compute_derived_fields, derive_rows, sort_rows, AggregateStats,
    DerivedRow, Direction, MonitorRecord, SortDirection, SortDirective, SortField,
};
pub use error::SourceError;
pub use source::{ChannelSource, DataSource, FileSource, HttpSource, MonitorClient};
