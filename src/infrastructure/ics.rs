//! ICS (RFC 5545) event extraction
//!
//! The published calendar feed is plain iCalendar text. Availability
//! only needs `VEVENT` windows plus their summary/description, so this
//! is a deliberately small parser, not a general iCalendar library:
//!
//! - long lines are unfolded (continuations start with space or tab)
//! - nested components (`VALARM` etc.) are skipped wholesale
//! - `DTSTART`/`DTEND` accept UTC (`...Z`), floating local time, and
//!   all-day `VALUE=DATE` forms; offset-less values are interpreted in
//!   the configured application timezone
//! - text values are unescaped per RFC 5545 (`\n`, `\,`, `\;`, `\\`)
//!
//! An event missing `DTSTART` or `DTEND` is ignored, but a value that
//! fails to parse is a hard error: a silently dropped reservation would
//! let a double-booking through.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::domain::TimeWindow;

#[derive(Debug, Error)]
pub enum IcsError {
    #[error("invalid datetime value: {0}")]
    InvalidDateTime(String),
}

/// One parsed `VEVENT`.
#[derive(Debug, Clone)]
pub struct IcsEvent {
    pub window: TimeWindow,
    pub summary: String,
    pub description: String,
}

/// Extract all timed events from an iCalendar document.
pub fn parse_events(text: &str, fallback_offset: FixedOffset) -> Result<Vec<IcsEvent>, IcsError> {
    let mut events = Vec::new();
    let mut current: Option<PendingEvent> = None;
    let mut nested = 0usize;

    for line in unfold(text) {
        let (name, params, value) = split_property(&line);

        match (name.as_str(), value) {
            ("BEGIN", "VEVENT") if current.is_none() => {
                current = Some(PendingEvent::default());
            }
            ("BEGIN", _) if current.is_some() => nested += 1,
            ("END", "VEVENT") if nested == 0 => {
                if let Some(pending) = current.take() {
                    if let Some(event) = pending.finish() {
                        events.push(event);
                    }
                }
            }
            ("END", _) if current.is_some() && nested > 0 => nested -= 1,
            _ if nested > 0 => {}
            (prop, value) => {
                if let Some(pending) = current.as_mut() {
                    match prop {
                        "DTSTART" => {
                            pending.start = Some(parse_datetime(value, &params, fallback_offset)?)
                        }
                        "DTEND" => {
                            pending.end = Some(parse_datetime(value, &params, fallback_offset)?)
                        }
                        "SUMMARY" => pending.summary = unescape(value),
                        "DESCRIPTION" => pending.description = unescape(value),
                        _ => {}
                    }
                }
            }
        }
    }

    Ok(events)
}

#[derive(Default)]
struct PendingEvent {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    summary: String,
    description: String,
}

impl PendingEvent {
    fn finish(self) -> Option<IcsEvent> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(IcsEvent {
                window: TimeWindow::new(start, end),
                summary: self.summary,
                description: self.description,
            }),
            _ => None,
        }
    }
}

/// Undo RFC 5545 line folding: a line starting with space or tab
/// continues the previous one.
fn unfold(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        if let Some(rest) = raw.strip_prefix(' ').or_else(|| raw.strip_prefix('\t')) {
            if let Some(last) = lines.last_mut() {
                last.push_str(rest);
                continue;
            }
        }
        if !raw.is_empty() {
            lines.push(raw.to_string());
        }
    }
    lines
}

/// Split `NAME;PARAM=V;PARAM=V:VALUE` into (name, params, value).
fn split_property(line: &str) -> (String, Vec<String>, &str) {
    let (head, value) = match line.split_once(':') {
        Some((h, v)) => (h, v),
        None => (line, ""),
    };
    let mut parts = head.split(';');
    let name = parts.next().unwrap_or("").to_ascii_uppercase();
    let params = parts.map(|p| p.to_ascii_uppercase()).collect();
    (name, params, value)
}

fn parse_datetime(
    value: &str,
    params: &[String],
    fallback_offset: FixedOffset,
) -> Result<DateTime<Utc>, IcsError> {
    let invalid = || IcsError::InvalidDateTime(value.to_string());

    if params.iter().any(|p| p == "VALUE=DATE") {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").map_err(|_| invalid())?;
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return local_to_utc(midnight, fallback_offset, value);
    }

    if let Some(stripped) = value.strip_suffix('Z') {
        let naive =
            NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S").map_err(|_| invalid())?;
        return Ok(naive.and_utc());
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").map_err(|_| invalid())?;
    local_to_utc(naive, fallback_offset, value)
}

fn local_to_utc(
    naive: NaiveDateTime,
    offset: FixedOffset,
    raw: &str,
) -> Result<DateTime<Utc>, IcsError> {
    naive
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| IcsError::InvalidDateTime(raw.to_string()))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────
