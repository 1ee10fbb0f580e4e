//! Availability oracle
//!
//! Answers "is this window free for this spot" from the read-side feed.
//! A feed fetch failure is a hard error: availability is never assumed
//! when it cannot be assessed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::application::ports::{CalendarFeed, EventWindow};
use crate::domain::{event_text, DomainResult, Spot, TimeWindow};

/// Transient query result, never persisted.
#[derive(Debug, Clone)]
pub struct AvailabilityResult {
    pub available: bool,
    /// The occupied windows that clash with the candidate. Bare windows
    /// only; reference codes never leave the engine through diagnostics.
    pub conflicts: Vec<TimeWindow>,
}

/// One row of the occupancy listing shown to the UI. Reference codes
/// are deliberately absent: the code is a bearer capability and
/// listings must only confirm occupancy.
#[derive(Debug, Clone)]
pub struct OccupancyEntry {
    pub spot: Spot,
    pub window: TimeWindow,
    pub name: Option<String>,
    pub plate: Option<String>,
}

pub struct AvailabilityService {
    feed: Arc<dyn CalendarFeed>,
}

impl AvailabilityService {
    pub fn new(feed: Arc<dyn CalendarFeed>) -> Self {
        Self { feed }
    }

    /// Check whether `candidate` is free on `spot`.
    ///
    /// With `exclude_ref`, entries carrying that reference code are
    /// ignored: a reschedule asks "is this free, not counting the
    /// booking I am about to move". Comparison is case-insensitive.
    pub async fn check(
        &self,
        spot: Spot,
        candidate: &TimeWindow,
        exclude_ref: Option<&str>,
    ) -> DomainResult<AvailabilityResult> {
        let events = self.feed.list_events(spot).await?;
        let exclude = exclude_ref.map(str::to_uppercase);

        let conflicts: Vec<TimeWindow> = events
            .iter()
            .filter(|e| !Self::is_excluded(e, exclude.as_deref()))
            .filter(|e| e.window.overlaps(candidate))
            .map(|e| e.window)
            .collect();

        debug!(
            spot = %spot,
            candidate = %candidate,
            conflicts = conflicts.len(),
            excluded = exclude.as_deref().unwrap_or("-"),
            "availability check"
        );

        Ok(AvailabilityResult {
            available: conflicts.is_empty(),
            conflicts,
        })
    }

    /// List occupancy for the given spots, optionally clipped to a
    /// range. Entries whose window merely touches the range bounds are
    /// kept, mirroring what a calendar UI wants to render.
    pub async fn list_occupancy(
        &self,
        spots: &[Spot],
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> DomainResult<Vec<OccupancyEntry>> {
        let mut entries = Vec::new();
        for &spot in spots {
            for event in self.feed.list_events(spot).await? {
                let in_range = from.is_none_or(|f| event.window.end >= f)
                    && until.is_none_or(|u| event.window.start <= u);
                if !in_range {
                    continue;
                }
                entries.push(OccupancyEntry {
                    spot,
                    window: event.window,
                    name: event_text::parse_name(Some(&event.description)),
                    plate: event_text::parse_plate(
                        Some(&event.description),
                        Some(&event.summary),
                    ),
                });
            }
        }
        Ok(entries)
    }

    fn is_excluded(event: &EventWindow, exclude: Option<&str>) -> bool {
        let Some(code) = exclude else {
            return false;
        };
        // Structured metadata is authoritative; free-text parsing is
        // the fallback for feeds that only carry human-readable fields.
        if let Some(structured) = &event.private_ref {
            return structured.to_uppercase() == code;
        }
        event_text::parse_reference(Some(&event.summary), Some(&event.description))
            .is_some_and(|parsed| parsed == code)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contact, ReservationDraft};
    use crate::infrastructure::memory::InMemoryCalendar;

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::new(start.parse().unwrap(), end.parse().unwrap())
    }

    fn contact() -> Contact {
        Contact {
            name: "Sam Carter".into(),
            phone: "416-555-0188".into(),
            email: "sam@example.com".into(),
        }
    }

    async fn seed(calendar: &InMemoryCalendar, spot: Spot, reference: &str, w: TimeWindow) {
        use crate::application::ports::CalendarStore;
        calendar
            .create_event(&ReservationDraft {
                spot,
                window: w,
                reference: reference.into(),
                contact: contact(),
                plate: "ABCD 123".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn overlapping_reservation_blocks_the_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        seed(
            &calendar,
            Spot::Northern,
            "XYZ234",
            window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z"),
        )
        .await;
        let service = AvailabilityService::new(calendar);

        let result = service
            .check(
                Spot::Northern,
                &window("2024-01-11T00:00:00Z", "2024-01-13T00:00:00Z"),
                None,
            )
            .await
            .unwrap();
        assert!(!result.available);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(
            result.conflicts[0],
            window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn touching_boundary_is_available() {
        let calendar = Arc::new(InMemoryCalendar::new());
        seed(
            &calendar,
            Spot::Northern,
            "XYZ234",
            window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z"),
        )
        .await;
        let service = AvailabilityService::new(calendar);

        let result = service
            .check(
                Spot::Northern,
                &window("2024-01-12T00:00:00Z", "2024-01-13T00:00:00Z"),
                None,
            )
            .await
            .unwrap();
        assert!(result.available);
        assert!(result.conflicts.is_empty());
    }

    #[tokio::test]
    async fn spots_are_independent() {
        let calendar = Arc::new(InMemoryCalendar::new());
        seed(
            &calendar,
            Spot::Northern,
            "XYZ234",
            window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z"),
        )
        .await;
        let service = AvailabilityService::new(calendar);

        let result = service
            .check(
                Spot::Southern,
                &window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z"),
                None,
            )
            .await
            .unwrap();
        assert!(result.available);
    }

    #[tokio::test]
    async fn excluding_own_reference_frees_the_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let w = window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z");
        seed(&calendar, Spot::Northern, "XYZ234", w).await;
        let service = AvailabilityService::new(calendar);

        // Same window, excluding the reservation that occupies it.
        let result = service
            .check(Spot::Northern, &w, Some("XYZ234"))
            .await
            .unwrap();
        assert!(result.available);

        // Exclusion is case-insensitive.
        let result = service
            .check(Spot::Northern, &w, Some("xyz234"))
            .await
            .unwrap();
        assert!(result.available);

        // A different code does not free it.
        let result = service
            .check(Spot::Northern, &w, Some("QQQQ99"))
            .await
            .unwrap();
        assert!(!result.available);
    }

    #[tokio::test]
    async fn exclusion_falls_back_to_text_parsing() {
        use async_trait::async_trait;

        // A feed with no structured metadata, like the production ICS
        // path: the code is only recoverable from the summary text.
        struct TextOnlyFeed;

        #[async_trait]
        impl crate::application::ports::CalendarFeed for TextOnlyFeed {
            async fn list_events(&self, _spot: Spot) -> DomainResult<Vec<EventWindow>> {
                Ok(vec![EventWindow {
                    window: TimeWindow::new(
                        "2024-01-10T00:00:00Z".parse().unwrap(),
                        "2024-01-12T00:00:00Z".parse().unwrap(),
                    ),
                    summary: "[northern] ABCD 123 (ref XYZ234)".into(),
                    description: String::new(),
                    private_ref: None,
                }])
            }
        }

        let service = AvailabilityService::new(Arc::new(TextOnlyFeed));
        let w = window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z");

        let result = service
            .check(Spot::Northern, &w, Some("xyz234"))
            .await
            .unwrap();
        assert!(result.available);

        let result = service.check(Spot::Northern, &w, None).await.unwrap();
        assert!(!result.available);
    }

    #[tokio::test]
    async fn occupancy_listing_parses_fields_and_clips_range() {
        let calendar = Arc::new(InMemoryCalendar::new());
        seed(
            &calendar,
            Spot::Northern,
            "XYZ234",
            window("2024-01-10T00:00:00Z", "2024-01-12T00:00:00Z"),
        )
        .await;
        seed(
            &calendar,
            Spot::Southern,
            "QQQQ99",
            window("2024-03-01T00:00:00Z", "2024-03-02T00:00:00Z"),
        )
        .await;
        let service = AvailabilityService::new(calendar);

        let all = service
            .list_occupancy(&Spot::ALL, None, None)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name.as_deref(), Some("Sam Carter"));
        assert_eq!(all[0].plate.as_deref(), Some("ABCD 123"));

        let january = service
            .list_occupancy(
                &Spot::ALL,
                Some("2024-01-01T00:00:00Z".parse().unwrap()),
                Some("2024-01-31T00:00:00Z".parse().unwrap()),
            )
            .await
            .unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].spot, Spot::Northern);
    }
}
