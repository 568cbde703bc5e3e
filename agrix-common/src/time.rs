//! Timestamp utilities

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a record-store timestamp leniently
///
/// Accepts RFC 3339 (`2023-05-14T08:30:00Z`, with or without fractional
/// seconds, any offset), SQL style (`2023-05-14 08:30:00`) and bare dates
/// (`2023-05-14`). The result is the wall-clock time as written; an offset
/// is dropped, not applied. Anything else yields `None`.
pub fn parse_local(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_local());
    }
    parse_naive(raw)
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    if raw.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Calendar year and month (1-12) of a record-store timestamp
///
/// Taken from the date as written: `2023-12-31T20:00:00-08:00` is
/// December 2023, not January 2024.
pub fn year_month(raw: &str) -> Option<(i32, u32)> {
    parse_local(raw).map(|ts| (ts.year(), ts.month()))
}

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    now().year()
}
