//! Calendar event text encoding
//!
//! A reservation is persisted as a calendar event. The write-side API
//! carries structured metadata, but the read-side ICS feed may only
//! expose the human-readable summary and description, so every field we
//! need later is also embedded in a conventional text form:
//!
//! - summary: `[{spot}] {plate} (ref {CODE})`
//! - description: `Name:`/`Phone:`/`Email:`/`Plate:`/`Reference:` lines
//!   plus an advisory payment hint.
//!
//! The parsers here are the fallback path; structured metadata is
//! authoritative when both are present.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Contact, Spot};

static SUMMARY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(ref\s+([A-Z0-9]{4,10})\)").unwrap());
static DESC_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Reference:\s*([A-Z0-9]{4,10})").unwrap());
static DESC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Name:\s*([^\n\r]+)").unwrap());
static DESC_PLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Plate:\s*([^\n\r]+)").unwrap());
static SUMMARY_PLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\s*([^(]+)\s*\(").unwrap());

/// Canonical event summary: `[northern] ABC123 (ref XYZ234)`.
pub fn summary(spot: Spot, plate: &str, reference: &str) -> String {
    format!("[{spot}] {plate} (ref {reference})")
}

/// Canonical event description. The e-transfer line is advisory text;
/// payment itself is out of band.
pub fn description(contact: &Contact, plate: &str, reference: &str, owner_email: &str) -> String {
    format!(
        "Name: {}\nPhone: {}\nEmail: {}\nPlate: {}\nReference: {}\nPay by e-transfer to {}",
        contact.name, contact.phone, contact.email, plate, reference, owner_email
    )
}

/// Recover a reference code from event text, uppercased.
///
/// Tries the summary token first, then the description line.
pub fn parse_reference(summary: Option<&str>, description: Option<&str>) -> Option<String> {
    if let Some(s) = summary {
        if let Some(m) = SUMMARY_REF.captures(s) {
            return Some(m[1].to_uppercase());
        }
    }
    if let Some(d) = description {
        if let Some(m) = DESC_REF.captures(d) {
            return Some(m[1].to_uppercase());
        }
    }
    None
}

/// Recover the customer name from the description.
pub fn parse_name(description: Option<&str>) -> Option<String> {
    DESC_NAME
        .captures(description?)
        .map(|m| m[1].trim().to_string())
}

/// Recover the plate, preferring the description line over the summary
/// span.
pub fn parse_plate(description: Option<&str>, summary: Option<&str>) -> Option<String> {
    if let Some(d) = description {
        if let Some(m) = DESC_PLATE.captures(d) {
            return Some(m[1].trim().to_string());
        }
    }
    SUMMARY_PLATE
        .captures(summary?)
        .map(|m| m[1].trim().to_string())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            name: "Sam Carter".into(),
            phone: "416-555-0188".into(),
            email: "sam@example.com".into(),
        }
    }

    #[test]
    fn encode_parse_roundtrip() {
        let s = summary(Spot::Northern, "ABCD 123", "XYZ234");
        let d = description(&contact(), "ABCD 123", "XYZ234", "owner@example.com");

        assert_eq!(s, "[northern] ABCD 123 (ref XYZ234)");
        assert_eq!(parse_reference(Some(&s), None).as_deref(), Some("XYZ234"));
        assert_eq!(parse_reference(None, Some(&d)).as_deref(), Some("XYZ234"));
        assert_eq!(parse_name(Some(&d)).as_deref(), Some("Sam Carter"));
        assert_eq!(parse_plate(Some(&d), None).as_deref(), Some("ABCD 123"));
        assert_eq!(parse_plate(None, Some(&s)).as_deref(), Some("ABCD 123"));
    }

    #[test]
    fn summary_token_wins_over_description() {
        let s = "[southern] AAA111 (ref AAAA22)";
        let d = "Reference: BBBB33";
        assert_eq!(parse_reference(Some(s), Some(d)).as_deref(), Some("AAAA22"));
    }

    #[test]
    fn parse_is_case_insensitive_and_uppercases() {
        assert_eq!(
            parse_reference(Some("[northern] x (REF xyz234)"), None).as_deref(),
            Some("XYZ234")
        );
        assert_eq!(
            parse_reference(None, Some("reference: abcd99")).as_deref(),
            Some("ABCD99")
        );
    }

    #[test]
    fn unrelated_text_yields_nothing() {
        assert_eq!(parse_reference(Some("Dentist appointment"), None), None);
        assert_eq!(parse_reference(None, Some("call back tomorrow")), None);
        assert_eq!(parse_name(Some("no labels here")), None);
        assert_eq!(parse_plate(None, Some("no brackets")), None);
        assert_eq!(parse_reference(None, None), None);
    }

    #[test]
    fn ref_shorter_than_four_chars_is_ignored() {
        assert_eq!(parse_reference(Some("[northern] x (ref AB1)"), None), None);
    }
}
