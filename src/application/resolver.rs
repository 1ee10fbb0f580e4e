//! Reference resolver
//!
//! Locates the stored calendar event behind a `(spot, reference code)`
//! pair. The store's search is fuzzy (the query may match the code
//! substring anywhere in free text), so results are re-filtered
//! client-side for an exact match, structured metadata first.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use crate::application::ports::{CalendarStore, StoredEvent};
use crate::domain::{event_text, DomainResult, Spot};

/// Reservations are not expected to be looked up far outside the
/// booking horizon; searching a bounded window keeps the rate-limited
/// store call cheap.
const SEARCH_HORIZON_DAYS: i64 = 365;

pub struct ReferenceResolver {
    store: Arc<dyn CalendarStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self { store }
    }

    /// Find the event holding `reference` on `spot`, or `None`.
    pub async fn resolve(&self, spot: Spot, reference: &str) -> DomainResult<Option<StoredEvent>> {
        let code = reference.trim().to_uppercase();
        if code.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let results = self
            .store
            .search_events(
                spot,
                &code,
                now - Duration::days(SEARCH_HORIZON_DAYS),
                now + Duration::days(SEARCH_HORIZON_DAYS),
            )
            .await?;

        debug!(spot = %spot, reference = %code, candidates = results.len(), "resolving reference");

        Ok(results.into_iter().find(|e| Self::matches(e, &code)))
    }

    fn matches(event: &StoredEvent, code: &str) -> bool {
        if let Some(structured) = &event.private_ref {
            if structured.to_uppercase() == code {
                return true;
            }
        }
        event_text::parse_reference(event.summary.as_deref(), event.description.as_deref())
            .is_some_and(|parsed| parsed == code)
    }
}

// ── Tests ──────────────────────────────────────────────────────
