//! Data models and processing for monitor records.
//!
//! This module handles the transformation of raw monitor records into
//! derived, ordered rows suitable for display.
//!
//! ## Submodules
//!
//! - [`record`]: The fetched [`MonitorRecord`] and its [`Direction`]
//! - [`view_model`]: Derived fields, sorting and summary counts
//! - [`format`]: Display formatting for prices, timestamps and TTLs
//!
//! ## Data Flow
//!
//! ```text
//! Vec<MonitorRecord> (one fetch)
//!        │
//!        ├──▶ compute_aggregates()  ──▶ AggregateStats (once per fetch)
//!        │
//!        ▼
//! derive_rows() ──▶ sort_rows(directive) ──▶ Vec<DerivedRow> (every render)
//! ```

pub mod format;
pub mod record;
pub mod view_model;

pub use record::{Direction, MonitorRecord};
pub use view_model::{
    compute_aggregates, compute_derived_fields, derive_rows, sort_rows, AggregateStats,
    DerivedRow, SortDirection, SortDirective, SortField,
};
