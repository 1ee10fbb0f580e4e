//! In-memory calendar for development and testing
//!
//! Implements both ports over one map so the feed immediately reflects
//! writes (the opposite of production, where the feed lags the store).
//! Good enough for exercising the coordination logic without a network.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::application::ports::{CalendarFeed, CalendarStore, EventWindow, StoredEvent};
use crate::domain::{event_text, DomainError, DomainResult, ReservationDraft, Spot, TimeWindow};

const TEST_OWNER_EMAIL: &str = "owner@example.test";

#[derive(Debug, Clone)]
struct StoredRecord {
    spot: Spot,
    window: TimeWindow,
    summary: String,
    description: String,
    private_ref: String,
}

/// In-memory calendar keyed by synthetic event ids.
pub struct InMemoryCalendar {
    events: DashMap<String, StoredRecord>,
    id_counter: AtomicU64,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self {
            events: DashMap::new(),
            id_counter: AtomicU64::new(1),
        }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for InMemoryCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarFeed for InMemoryCalendar {
    async fn list_events(&self, spot: Spot) -> DomainResult<Vec<EventWindow>> {
        Ok(self
            .events
            .iter()
            .filter(|entry| entry.spot == spot)
            .map(|entry| EventWindow {
                window: entry.window,
                summary: entry.summary.clone(),
                description: entry.description.clone(),
                private_ref: Some(entry.private_ref.clone()),
            })
            .collect())
    }
}

#[async_trait]
impl CalendarStore for InMemoryCalendar {
    async fn create_event(&self, draft: &ReservationDraft) -> DomainResult<String> {
        let id = format!("evt-{}", self.id_counter.fetch_add(1, Ordering::SeqCst));
        self.events.insert(
            id.clone(),
            StoredRecord {
                spot: draft.spot,
                window: draft.window,
                summary: event_text::summary(draft.spot, &draft.plate, &draft.reference),
                description: event_text::description(
                    &draft.contact,
                    &draft.plate,
                    &draft.reference,
                    TEST_OWNER_EMAIL,
                ),
                private_ref: draft.reference.clone(),
            },
        );
        Ok(id)
    }

    async fn search_events(
        &self,
        spot: Spot,
        query: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> DomainResult<Vec<StoredEvent>> {
        // Like the real store's search: substring match anywhere in the
        // event text, clipped to the time range.
        let needle = query.to_uppercase();
        let range = TimeWindow::new(time_min, time_max);
        Ok(self
            .events
            .iter()
            .filter(|entry| entry.spot == spot && entry.window.overlaps(&range))
            .filter(|entry| {
                entry.summary.to_uppercase().contains(&needle)
                    || entry.description.to_uppercase().contains(&needle)
                    || entry.private_ref.to_uppercase() == needle
            })
            .map(|entry| StoredEvent {
                id: entry.key().clone(),
                summary: Some(entry.summary.clone()),
                description: Some(entry.description.clone()),
                private_ref: Some(entry.private_ref.clone()),
            })
            .collect())
    }

    async fn update_event_window(
        &self,
        spot: Spot,
        event_id: &str,
        window: &TimeWindow,
    ) -> DomainResult<()> {
        let mut entry = self
            .events
            .get_mut(event_id)
            .filter(|e| e.spot == spot)
            .ok_or_else(|| DomainError::Write(format!("no such event {event_id}")))?;
        entry.window = *window;
        Ok(())
    }

    async fn delete_event(&self, spot: Spot, event_id: &str) -> DomainResult<()> {
        let removed = self
            .events
            .remove_if(event_id, |_, record| record.spot == spot);
        if removed.is_none() {
            return Err(DomainError::Write(format!("no such event {event_id}")));
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
