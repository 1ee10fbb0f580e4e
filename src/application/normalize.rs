//! Time window normalization
//!
//! Canonicalizes a requested (start, end) pair against booking policy
//! before any availability check. Pure and deterministic given `now`.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, DomainResult, TimeWindow};

/// Policy constants, externally configurable.
#[derive(Debug, Clone, Copy)]
pub struct WindowPolicy {
    /// How far ahead a reservation may start.
    pub max_advance_days: i64,
    /// Longest allowed reservation.
    pub max_duration_days: i64,
    /// Starts within this many minutes of `now` are treated as "book
    /// for right now" and bumped forward instead of rejected.
    pub grace_minutes: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            max_advance_days: 30,
            max_duration_days: 90,
            grace_minutes: 5,
        }
    }
}

/// A validated window plus the policy decision trail.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedWindow {
    pub window: TimeWindow,
    /// Whether the start was bumped to `now + 1 minute`. Surfaced back
    /// to the caller so nobody downstream assumes the original input
    /// was honored verbatim.
    pub bumped: bool,
}

impl WindowPolicy {
    /// Normalize a window for a new booking.
    ///
    /// A start at or before `now + grace_minutes` is silently bumped to
    /// `now + 1 minute`; this absorbs clock skew and "starting now"
    /// requests without forcing the caller to recompute. The bump
    /// happens before all subsequent validation.
    pub fn normalize_booking(
        &self,
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<NormalizedWindow> {
        let (start, bumped) = if start <= now + Duration::minutes(self.grace_minutes) {
            (now + Duration::minutes(1), true)
        } else {
            (start, false)
        };
        self.validate(now, start, end)?;
        Ok(NormalizedWindow {
            window: TimeWindow::new(start, end),
            bumped,
        })
    }

    /// Normalize a window for a reschedule: same bounds, but a start at
    /// or before `now` is rejected rather than bumped. Moving a booking
    /// "to right now" is always an explicit caller decision.
    pub fn normalize_reschedule(
        &self,
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<NormalizedWindow> {
        if start <= now {
            return Err(DomainError::Validation(
                "start must be in the future".into(),
            ));
        }
        self.validate(now, start, end)?;
        Ok(NormalizedWindow {
            window: TimeWindow::new(start, end),
            bumped: false,
        })
    }

    fn validate(&self, now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
        if start - now > Duration::days(self.max_advance_days) {
            return Err(DomainError::Validation(format!(
                "start must be within {} days",
                self.max_advance_days
            )));
        }
        if end <= start {
            return Err(DomainError::Validation("end must be after start".into()));
        }
        if end - start > Duration::days(self.max_duration_days) {
            return Err(DomainError::Validation(format!(
                "duration cannot exceed {} days",
                self.max_duration_days
            )));
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
