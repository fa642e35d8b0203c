//! JSON export of the current table.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_json::{json, Value};

use crate::data::{AggregateStats, DerivedRow, SortDirective};

/// Build the export document: summary counts, the active sort, and the
/// rows in display order.
pub fn build_export(
    rows: &[DerivedRow],
    stats: &AggregateStats,
    sort: &SortDirective,
    prefix: &str,
) -> Value {
    json!({
        "prefix": prefix,
        "summary": stats,
        "sort": sort,
        "rows": rows,
    })
}

/// Write an export document to `path` as pretty-printed JSON.
pub fn write_export(path: &Path, export: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json)?;
    Ok(())
}
