//! Timestamp and date parsing for export cells and CLI arguments.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{InsightsError, Result};

/// Date-time layouts seen in platform exports, tried in order.
///
/// Slash dates are read month-first and fall back to day-first when the
/// month-first reading is impossible (e.g. `13/01/2024`).
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Parse an export timestamp cell into a naive wall-clock date-time.
///
/// Handles:
/// * RFC 3339 / ISO 8601 with an offset or `Z` suffix (the offset is dropped
///   and the local wall-clock time kept).
/// * ISO dates with `T` or a space separator, with or without seconds.
/// * Slash dates, month-first then day-first.
/// * Bare dates (midnight).
///
/// Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    debug!("could not parse timestamp \"{}\"", s);
    None
}

/// Parse a `YYYY-MM-DD` date given on the command line.
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| InsightsError::InvalidDate(raw.to_string()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
