//! Outbound ports — interfaces to the external calendar store
//!
//! The engine has no database of its own: one third-party calendar per
//! spot is both the system of record and the conflict-detection source.
//! Two read paths exist with different consistency:
//!
//! - [`CalendarFeed`] — the published ICS feed, cached and eventually
//!   consistent; cheap, used for availability pre-checks only.
//! - [`CalendarStore`] — the read/write API, strongly consistent but
//!   rate-limited; used for all mutations and for resolving reference
//!   codes.
//!
//! Production implementations live in
//! [`infrastructure::google`](crate::infrastructure::google); tests use
//! [`InMemoryCalendar`](crate::infrastructure::memory::InMemoryCalendar).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DomainResult, ReservationDraft, Spot, TimeWindow};

/// One entry from the read-side feed. The feed may expose only
/// human-readable text, so structured fields are recovered by parsing
/// `summary`/`description` when `private_ref` is absent.
#[derive(Debug, Clone)]
pub struct EventWindow {
    pub window: TimeWindow,
    pub summary: String,
    pub description: String,
    /// Structured reference code, for feeds that carry one. The ICS
    /// feed does not; the in-memory calendar does.
    pub private_ref: Option<String>,
}

/// One entry from the write-side search. Unlike the feed, the store
/// exposes structured private metadata when the event carries it.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    /// Store-assigned handle, required for update/delete.
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Structured reference code, authoritative when present.
    pub private_ref: Option<String>,
}

/// Read-side collaborator: list every known reservation window for a
/// spot. May be stale by design; never used to resolve reference codes.
#[async_trait]
pub trait CalendarFeed: Send + Sync {
    async fn list_events(&self, spot: Spot) -> DomainResult<Vec<EventWindow>>;
}

/// Write-side collaborator. Every call obtains a fresh access
/// credential; acquisition failure is a hard error. The store offers no
/// transactions and no conditional writes, so all coordination lives in
/// the application layer.
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Persist a draft; returns the store-assigned event id.
    async fn create_event(&self, draft: &ReservationDraft) -> DomainResult<String>;

    /// Server-side fuzzy search bounded to `[time_min, time_max]`.
    /// The query may match anywhere in free text, so callers must
    /// re-filter for exact matches.
    async fn search_events(
        &self,
        spot: Spot,
        query: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<StoredEvent>>;

    /// Move an existing event to a new window.
    async fn update_event_window(
        &self,
        spot: Spot,
        event_id: &str,
        window: &TimeWindow,
    ) -> DomainResult<()>;

    /// Delete an event.
    async fn delete_event(&self, spot: Spot, event_id: &str) -> DomainResult<()>;
}
