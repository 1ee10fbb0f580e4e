//! Time windows
//!
//! A reservation occupies a half-open interval `[start, end)`. Two
//! windows that merely touch at an endpoint do not overlap, so a booking
//! may end at the exact instant the next one begins.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// A half-open time interval `[start, end)` in UTC.
///
/// Policy checks happen against the application timezone, but all
/// arithmetic and persistence use absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `s1 < e2 && s2 < e1`. Touching endpoints do not conflict.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        )
    }
}

/// Parse a caller-supplied timestamp.
///
/// RFC 3339 strings are taken at face value. Offset-less forms
/// (`2024-01-10T09:00` or `...T09:00:00`) are interpreted in the
/// configured application timezone `offset`.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> DomainResult<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|_| DomainError::Validation(format!("invalid datetime: {raw}")))?;

    naive
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| DomainError::Validation(format!("ambiguous datetime: {raw}")))
}

// ── Tests ──────────────────────────────────────────────────────
