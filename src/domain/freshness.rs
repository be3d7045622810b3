//! Daily freshness policy for persisted snapshots
//!
//! A snapshot is valid for the calendar day it was captured on. The first
//! check after local midnight asks for exactly one refetch; any problem reading
//! the snapshot is treated the same as having none.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Outcome of inspecting a persisted snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// No snapshot has been written yet
    Missing,
    /// A snapshot exists but its timestamp could not be recovered
    Unreadable(String),
    /// Captured on an earlier day
    Stale { captured: NaiveDate },
    /// Captured today (or, with a skewed clock, later)
    Current { captured: NaiveDate },
}

impl Freshness {
    pub const fn requires_refetch(&self) -> bool {
        !matches!(self, Self::Current { .. })
    }
}

/// Decide whether a new scrape cycle is needed.
///
/// `snapshot` is the raw content of the structured snapshot file, `None` when
/// it does not exist.
pub fn should_refetch(snapshot: Option<&str>, now: NaiveDateTime) -> bool {
    assess(snapshot, now).requires_refetch()
}

/// Classify a snapshot against the current time
pub fn assess(snapshot: Option<&str>, now: NaiveDateTime) -> Freshness {
    let Some(content) = snapshot else {
        return Freshness::Missing;
    };

    let document: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => return Freshness::Unreadable(format!("invalid JSON: {e}")),
    };

    let Some(raw) = document.get("timestamp") else {
        return Freshness::Unreadable("missing timestamp".to_string());
    };
    let Some(raw) = raw.as_str() else {
        return Freshness::Unreadable(format!("timestamp is not a string: {raw}"));
    };

    match parse_capture_date(raw) {
        Some(captured) if captured < now.date() => Freshness::Stale { captured },
        Some(captured) => Freshness::Current { captured },
        None => Freshness::Unreadable(format!("unparseable timestamp: {raw}")),
    }
}

/// Offset-qualified layouts beyond RFC 3339: basic `+0900` offsets and
/// minute precision
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Naive layouts beyond chrono's default `T`-separated form
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Calendar date of an ISO-8601 timestamp, in the timestamp's own reference.
///
/// Accepts offset-qualified (`2024-01-01T23:00:00+09:00`, `...+0900`), naive
/// (`2024-01-01T23:00:00.123456`, `2024-01-01 23:00:00`, `2024-01-01T23:00`)
/// and date-only forms.
pub fn parse_capture_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.date_naive());
    }
    if let Some(with_offset) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(with_offset.date_naive());
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.date());
    }
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(naive.date());
    }
    raw.parse::<NaiveDate>().ok()
}
