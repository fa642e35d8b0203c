//! Table view model.
//!
//! Turns the raw records of a fetch into derived display rows, orders them
//! for rendering, and computes the summary counts. Everything here is pure:
//! rows are re-derived on every render and nothing is cached across fetches.

use std::cmp::Ordering;

use serde::Serialize;

use super::record::{Direction, MonitorRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Column the table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Sort by pair name.
    Pair,
    /// Sort by the distance between current and monitor price.
    PriceDiff,
}

impl SortField {
    /// Parse a field name as used in config and on the command line.
    ///
    /// Returns `None` for anything unrecognized; sorting without a
    /// directive falls back to pair ascending.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pair" => Some(SortField::Pair),
            "pricediff" | "price_diff" | "price-diff" | "diff" => Some(SortField::PriceDiff),
            _ => None,
        }
    }

    /// The other sortable column.
    pub fn next(self) -> Self {
        match self {
            SortField::Pair => SortField::PriceDiff,
            SortField::PriceDiff => SortField::Pair,
        }
    }

    /// Short name shown in the table title.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Pair => "pair",
            SortField::PriceDiff => "diff",
        }
    }
}

/// Order of the sorted column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Which column the table is ordered by, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortDirective {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortDirective {
    /// Smallest price diff first: the pairs closest to triggering.
    fn default() -> Self {
        Self::new(SortField::PriceDiff, SortDirection::Ascending)
    }
}

impl SortDirective {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Apply a column selection.
    ///
    /// Selecting the active column flips the direction; selecting another
    /// column switches to it in ascending order.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flip();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// A record annotated with the values the table displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    #[serde(flatten)]
    pub record: MonitorRecord,
    /// `|close - monitor| / monitor * 100`, rounded to 2 decimals.
    pub price_diff_percent: f64,
    /// TTL in days, rounded to 1 decimal.
    pub ttl_days: f64,
}

impl DerivedRow {
    /// The price diff as shown in the table, always with two decimals.
    pub fn price_diff_label(&self) -> String {
        format!("{:.2}", self.price_diff_percent)
    }
}

/// Summary counts over a whole fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateStats {
    pub total: usize,
    pub long_count: usize,
    pub short_count: usize,
}

/// Percentage distance between the current close and the monitor price.
///
/// Zero when either price is zero or not a finite number.
pub fn price_diff_percent(current: f64, monitor: f64) -> f64 {
    if !current.is_finite() || !monitor.is_finite() || current == 0.0 || monitor == 0.0 {
        return 0.0;
    }
    round_to((current - monitor).abs() / monitor * 100.0, 2)
}

fn ttl_days(ttl_seconds: f64) -> f64 {
    if !ttl_seconds.is_finite() {
        return 0.0;
    }
    round_to(ttl_seconds / SECONDS_PER_DAY, 1)
}

/// Round to `decimals` places on the decimal value, as a formatted label
/// shows it, then parse it back.
fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    format!("{:.*}", decimals, value)
        .parse::<f64>()
        .ok()
        .filter(|rounded| rounded.is_finite())
        .unwrap_or(0.0)
}

/// Derive the display fields for one record.
pub fn compute_derived_fields(record: &MonitorRecord) -> DerivedRow {
    DerivedRow {
        price_diff_percent: price_diff_percent(record.current_close, record.monitor_price),
        ttl_days: ttl_days(record.ttl_seconds),
        record: record.clone(),
    }
}

/// Derive display rows for every record, preserving input order.
pub fn derive_rows(records: &[MonitorRecord]) -> Vec<DerivedRow> {
    records.iter().map(compute_derived_fields).collect()
}

/// Compare pair names the way a locale-aware collation would for symbols:
/// case-insensitive first, exact string as the tie-break.
pub fn compare_pairs(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Return the rows ordered by the given directive.
///
/// Without a directive the rows are ordered by pair, ascending. The input
/// slice is left untouched.
pub fn sort_rows(rows: &[DerivedRow], directive: Option<&SortDirective>) -> Vec<DerivedRow> {
    let directive = directive
        .copied()
        .unwrap_or(SortDirective::new(SortField::Pair, SortDirection::Ascending));

    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| compare_rows(a, b, &directive));
    sorted
}

fn compare_rows(a: &DerivedRow, b: &DerivedRow, directive: &SortDirective) -> Ordering {
    match directive.field {
        SortField::Pair => directive
            .direction
            .apply(compare_pairs(&a.record.pair, &b.record.pair)),
        SortField::PriceDiff => {
            let primary = directive
                .direction
                .apply(a.price_diff_percent.total_cmp(&b.price_diff_percent));

            // Keep equal diffs in a stable pair order between polls
            primary.then_with(|| compare_pairs(&a.record.pair, &b.record.pair))
        }
    }
}

/// Count records in total and per direction.
pub fn compute_aggregates(records: &[MonitorRecord]) -> AggregateStats {
    records.iter().fold(AggregateStats::default(), |mut stats, record| {
        stats.total += 1;
        match record.direction {
            Direction::Long => stats.long_count += 1,
            Direction::Short => stats.short_count += 1,
            Direction::Unknown => {}
        }
        stats
    })
}
