use chrono::NaiveDateTime;

use super::view_model::DerivedRow;

/// Display format for monitor timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a price with five decimals.
pub fn format_price(price: f64) -> String {
    format!("{:.5}", price)
}

/// Format a monitor timestamp, or `-` when unknown.
pub fn format_timestamp(timestamp: Option<NaiveDateTime>) -> String {
    timestamp
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Format the remaining TTL in days.
///
/// A negative TTL means the entry has no expiry (or no longer exists on the
/// backend) and is shown as `-`.
pub fn format_ttl(row: &DerivedRow) -> String {
    if row.record.ttl_seconds < 0.0 {
        "-".to_string()
    } else {
        format!("{:.1}", row.ttl_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Direction, MonitorRecord};
    use crate::data::view_model::compute_derived_fields;
    use chrono::NaiveDate;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1.0), "1.00000");
        assert_eq!(format_price(0.123456789), "0.12346");
    }

    #[test]
    fn test_format_timestamp() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(format_timestamp(Some(ts)), "2024-03-09 07:05:01");
        assert_eq!(format_timestamp(None), "-");
    }

    #[test]
    fn test_format_ttl() {
        let record = MonitorRecord::new("BTCUSDT", Direction::Long, 1.0, 1.0);
        let row = compute_derived_fields(&record.clone().with_ttl(172_800.0));
        assert_eq!(format_ttl(&row), "2.0");

        let row = compute_derived_fields(&record.with_ttl(-1.0));
        assert_eq!(format_ttl(&row), "-");
    }
}
