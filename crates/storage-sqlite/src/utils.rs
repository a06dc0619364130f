//! Helpers shared by the SQLite models.
//!
//! Timestamps are stored as fixed-width RFC 3339 text in UTC so that
//! lexical order in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use log::error;

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn format_optional_timestamp(value: &Option<DateTime<Utc>>) -> Option<String> {
    value.as_ref().map(format_timestamp)
}

/// Parse a stored timestamp. Unreadable values are logged and replaced by now.
pub fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            error!("Failed to parse datetime '{}': {}", value, e);
            Utc::now()
        })
}

pub fn parse_optional_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|s| {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(1500);
        assert!(format_timestamp(&whole) < format_timestamp(&later));
        assert_eq!(format_timestamp(&whole), "2024-03-01T12:00:00.000000Z");
    }

    #[test]
    fn parse_round_trips_and_tolerates_missing() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&at)), at);
        assert_eq!(parse_optional_timestamp(None), None);
        assert_eq!(parse_optional_timestamp(Some("garbage")), None);
    }
}
