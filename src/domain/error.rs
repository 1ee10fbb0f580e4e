//! Domain errors

use thiserror::Error;

use crate::domain::{Spot, TimeWindow};

/// Domain-level error taxonomy.
///
/// Collaborator failures (`Read`, `Write`, `Auth`) propagate in kind:
/// the coordinator adds context but never converts an unreadable feed
/// into a false "available" answer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Malformed or policy-violating input. Recoverable by the caller
    /// adjusting the request; never retried automatically.
    #[error("Validation: {0}")]
    Validation(String),

    /// Requested window is taken. Carries the conflicting windows so
    /// the caller can offer alternatives.
    #[error("Time not available: {} conflicting reservation(s)", .0.len())]
    Conflict(Vec<TimeWindow>),

    /// Reference code does not resolve for the given spot.
    #[error("No reservation {reference} on spot {spot}")]
    NotFound { spot: Spot, reference: String },

    /// Feed read failure. Availability cannot be assessed without data,
    /// so this is a hard error, not an empty result.
    #[error("Calendar feed read failed: {0}")]
    Read(String),

    /// Store write failure. Nothing was persisted; retrying is a caller
    /// decision since a blind retry risks a duplicate reservation.
    #[error("Calendar store write failed: {0}")]
    Write(String),

    /// Credential acquisition failure on the store's auth endpoint.
    #[error("Calendar credential acquisition failed: {0}")]
    Auth(String),
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── Tests ──────────────────────────────────────────────────────
