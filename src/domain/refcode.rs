//! Reference code generation
//!
//! A reference code is the bearer capability for one reservation:
//! whoever holds the code (plus the spot) may reschedule or cancel it.
//! Codes are short enough to read over the phone, drawn from an
//! alphabet without visually ambiguous characters (no `I`, `O`, `0`,
//! `1`).
//!
//! Uniqueness is not re-checked against the store: a collision only
//! matters if both codes are active on the same spot with overlapping
//! windows, which the availability gate already prevents.

use rand::Rng;

/// Restricted alphabet, 32 symbols.
pub const REF_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Fixed code length. 32^6 ≈ 1.07e9 combinations.
pub const REF_LEN: usize = 6;

/// Draw a fresh reference code.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..REF_LEN)
        .map(|_| REF_ALPHABET[rng.gen_range(0..REF_ALPHABET.len())] as char)
        .collect()
}

/// Whether a parsed candidate has the shape of a reference code.
///
/// Accepts 4–10 uppercase alphanumerics: wider than what we generate,
/// because codes recovered from free text may predate the current
/// alphabet.
pub fn is_plausible(code: &str) -> bool {
    (4..=10).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

// ── Tests ──────────────────────────────────────────────────────
