//! Reservation coordinator
//!
//! Write-path orchestration for create / reschedule / cancel / lookup.
//! The backing store offers no "check availability and commit"
//! primitive, so every mutation re-checks availability immediately
//! before writing and keeps the check-to-write gap free of other I/O.
//! The residual check-then-act race across processes cannot be closed
//! from here; whichever write lands first wins, and a suspected
//! double-grant is logged for manual reconciliation rather than hidden.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::application::availability::AvailabilityService;
use crate::application::normalize::WindowPolicy;
use crate::application::ports::CalendarStore;
use crate::application::resolver::ReferenceResolver;
use crate::domain::{
    refcode, Contact, DomainError, DomainResult, PriceBreakdown, RateCard, ReservationDraft,
    ReservationRecord, Spot, TimeWindow,
};

/// A booking request as it arrives from the transport layer, timestamps
/// already parsed but not yet validated.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub spot: Spot,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub contact: Contact,
    pub plate: String,
}

/// Outcome of a successful booking: the materialized record plus the
/// quoted price.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub record: ReservationRecord,
    pub price: PriceBreakdown,
    /// Whether the start was bumped off "right now"; the record's
    /// window is the one actually written, not the one requested.
    pub bumped: bool,
}

pub struct BookingService {
    availability: AvailabilityService,
    resolver: ReferenceResolver,
    store: Arc<dyn CalendarStore>,
    policy: WindowPolicy,
    rates: RateCard,
}

impl BookingService {
    pub fn new(
        availability: AvailabilityService,
        store: Arc<dyn CalendarStore>,
        policy: WindowPolicy,
        rates: RateCard,
    ) -> Self {
        Self {
            availability,
            resolver: ReferenceResolver::new(store.clone()),
            store,
            policy,
            rates,
        }
    }

    /// Book a spot. Normalizes the window, checks availability, writes
    /// the reservation, and prices the final window.
    ///
    /// No automatic retry on write failure: nothing was persisted and a
    /// blind retry from here would risk double-submission.
    pub async fn create(&self, req: BookingRequest) -> DomainResult<BookingConfirmation> {
        let normalized = self
            .policy
            .normalize_booking(Utc::now(), req.start, req.end)?;

        let availability = self
            .availability
            .check(req.spot, &normalized.window, None)
            .await?;
        if !availability.available {
            metrics::counter!("booking_conflicts_total", "spot" => req.spot.as_str()).increment(1);
            return Err(DomainError::Conflict(availability.conflicts));
        }

        let reference = refcode::generate();
        let draft = ReservationDraft {
            spot: req.spot,
            window: normalized.window,
            reference: reference.clone(),
            contact: req.contact,
            plate: req.plate,
        };
        let event_id = self.store.create_event(&draft).await?;
        let record = draft.into_record(event_id);

        let price = self.rates.quote(&record.window);
        metrics::counter!("bookings_created_total", "spot" => req.spot.as_str()).increment(1);
        info!(
            spot = %record.spot,
            reference = %record.reference,
            window = %record.window,
            bumped = normalized.bumped,
            price_cents = price.total_cents,
            "reservation created"
        );

        self.audit_after_create(record.spot, &record.window, &reference)
            .await;

        Ok(BookingConfirmation {
            record,
            price,
            bumped: normalized.bumped,
        })
    }

    /// Move an existing reservation to a new window.
    pub async fn reschedule(
        &self,
        spot: Spot,
        reference: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<()> {
        let normalized = self.policy.normalize_reschedule(Utc::now(), start, end)?;

        let availability = self
            .availability
            .check(spot, &normalized.window, Some(reference))
            .await?;
        if !availability.available {
            metrics::counter!("booking_conflicts_total", "spot" => spot.as_str()).increment(1);
            return Err(DomainError::Conflict(availability.conflicts));
        }

        let event = self.require(spot, reference).await?;
        self.store
            .update_event_window(spot, &event.id, &normalized.window)
            .await?;

        info!(spot = %spot, reference = %reference.to_uppercase(), window = %normalized.window, "reservation rescheduled");
        Ok(())
    }

    /// Cancel a reservation, destroying the backing event.
    pub async fn cancel(&self, spot: Spot, reference: &str) -> DomainResult<()> {
        let event = self.require(spot, reference).await?;
        self.store.delete_event(spot, &event.id).await?;

        info!(spot = %spot, reference = %reference.to_uppercase(), "reservation cancelled");
        Ok(())
    }

    /// Existence check only. Confirms or denies that the code resolves;
    /// never returns the underlying data.
    pub async fn lookup(&self, spot: Spot, reference: &str) -> DomainResult<bool> {
        Ok(self.resolver.resolve(spot, reference).await?.is_some())
    }

    async fn require(
        &self,
        spot: Spot,
        reference: &str,
    ) -> DomainResult<crate::application::ports::StoredEvent> {
        self.resolver
            .resolve(spot, reference)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                spot,
                reference: reference.trim().to_uppercase(),
            })
    }

    /// Best-effort race audit after a successful create.
    ///
    /// If the feed now shows a conflicting window other than our own,
    /// a concurrent request likely passed its availability check in the
    /// same gap and both writes landed. Operators reconcile manually;
    /// the caller still holds a valid confirmation.
    async fn audit_after_create(&self, spot: Spot, window: &TimeWindow, reference: &str) {
        match self.availability.check(spot, window, Some(reference)).await {
            Ok(result) if !result.conflicts.is_empty() => {
                metrics::counter!("race_ambiguity_total", "spot" => spot.as_str()).increment(1);
                warn!(
                    spot = %spot,
                    reference = %reference,
                    window = %window,
                    conflicts = result.conflicts.len(),
                    "possible concurrent double-grant detected after create"
                );
            }
            Ok(_) => {}
            // The booking already succeeded; an unreadable feed here is
            // not the caller's problem.
            Err(e) => debug!(spot = %spot, error = %e, "post-create audit skipped"),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;

    use crate::application::ports::{CalendarFeed, StoredEvent};
    use crate::infrastructure::memory::InMemoryCalendar;

    fn contact() -> Contact {
        Contact {
            name: "Sam Carter".into(),
            phone: "416-555-0188".into(),
            email: "sam@example.com".into(),
        }
    }

    fn request(spot: Spot, start_hours: i64, end_hours: i64) -> BookingRequest {
        let now = Utc::now();
        BookingRequest {
            spot,
            start: now + Duration::hours(start_hours),
            end: now + Duration::hours(end_hours),
            contact: contact(),
            plate: "ABCD 123".into(),
        }
    }

    fn service(calendar: Arc<InMemoryCalendar>) -> BookingService {
        BookingService::new(
            AvailabilityService::new(calendar.clone()),
            calendar,
            WindowPolicy::default(),
            RateCard::default(),
        )
    }

    #[tokio::test]
    async fn create_books_and_prices_a_free_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        let confirmation = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        assert_eq!(confirmation.record.reference.len(), 6);
        assert!(!confirmation.bumped);
        // 24 hours -> one day rate
        assert_eq!(confirmation.price.total_cents, 1500);
        assert_eq!(calendar.event_count(), 1);

        // The stored reservation is discoverable by its code.
        assert!(svc
            .lookup(Spot::Northern, &confirmation.record.reference)
            .await
            .unwrap());
        assert!(!svc.lookup(Spot::Southern, &confirmation.record.reference).await.unwrap());
    }

    #[tokio::test]
    async fn create_surfaces_the_bumped_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar);

        let confirmation = svc.create(request(Spot::Northern, 0, 24)).await.unwrap();
        assert!(confirmation.bumped);
        assert!(confirmation.record.window.start > Utc::now() - Duration::seconds(5));
    }

    #[tokio::test]
    async fn create_rejects_an_overlapping_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        let err = svc.create(request(Spot::Northern, 3, 20)).await.unwrap_err();
        match err {
            DomainError::Conflict(conflicts) => assert_eq!(conflicts.len(), 1),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(calendar.event_count(), 1);
    }

    #[tokio::test]
    async fn create_allows_the_other_spot() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        svc.create(request(Spot::Southern, 2, 26)).await.unwrap();
        assert_eq!(calendar.event_count(), 2);
    }

    #[tokio::test]
    async fn create_propagates_validation_errors() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        let err = svc.create(request(Spot::Northern, 26, 2)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(calendar.event_count(), 0);
    }

    #[tokio::test]
    async fn reschedule_to_own_window_succeeds() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar);

        let confirmation = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        svc.reschedule(
            Spot::Northern,
            &confirmation.record.reference,
            confirmation.record.window.start,
            confirmation.record.window.end,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn reschedule_moves_the_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        let confirmation = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        let now = Utc::now();
        svc.reschedule(
            Spot::Northern,
            &confirmation.record.reference,
            now + Duration::hours(48),
            now + Duration::hours(72),
        )
        .await
        .unwrap();

        // The old window is free again for someone else.
        let next = svc.create(request(Spot::Northern, 3, 20)).await.unwrap();
        assert_ne!(next.record.reference, confirmation.record.reference);
    }

    #[tokio::test]
    async fn reschedule_onto_another_booking_conflicts() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar);

        let first = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        let second = svc.create(request(Spot::Northern, 50, 74)).await.unwrap();

        let err = svc
            .reschedule(
                Spot::Northern,
                &second.record.reference,
                first.record.window.start,
                first.record.window.end,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn reschedule_unknown_reference_is_not_found() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar);

        let now = Utc::now();
        let err = svc
            .reschedule(
                Spot::Northern,
                "QQQQ99",
                now + Duration::hours(2),
                now + Duration::hours(4),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn cancel_frees_the_window() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar.clone());

        let confirmation = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        svc.cancel(Spot::Northern, &confirmation.record.reference)
            .await
            .unwrap();
        assert_eq!(calendar.event_count(), 0);
        assert!(!svc
            .lookup(Spot::Northern, &confirmation.record.reference)
            .await
            .unwrap());

        // Cancelling again is NotFound, not an error mapped elsewhere.
        let err = svc
            .cancel(Spot::Northern, &confirmation.record.reference)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let calendar = Arc::new(InMemoryCalendar::new());
        let svc = service(calendar);

        let confirmation = svc.create(request(Spot::Northern, 2, 26)).await.unwrap();
        let lower = confirmation.record.reference.to_lowercase();
        assert!(svc.lookup(Spot::Northern, &lower).await.unwrap());
    }

    /// Store whose writes always fail; reads come from an inner
    /// in-memory calendar.
    struct FailingStore {
        inner: Arc<InMemoryCalendar>,
    }

    #[async_trait]
    impl crate::application::ports::CalendarStore for FailingStore {
        async fn create_event(&self, _draft: &ReservationDraft) -> DomainResult<String> {
            Err(DomainError::Write("store unavailable".into()))
        }

        async fn search_events(
            &self,
            spot: Spot,
            query: &str,
            time_min: DateTime<Utc>,
            time_max: DateTime<Utc>,
        ) -> DomainResult<Vec<StoredEvent>> {
            self.inner
                .search_events(spot, query, time_min, time_max)
                .await
        }

        async fn update_event_window(
            &self,
            _spot: Spot,
            _event_id: &str,
            _window: &TimeWindow,
        ) -> DomainResult<()> {
            Err(DomainError::Write("store unavailable".into()))
        }

        async fn delete_event(&self, _spot: Spot, _event_id: &str) -> DomainResult<()> {
            Err(DomainError::Write("store unavailable".into()))
        }
    }

    /// Feed that always fails, for fail-closed behavior.
    struct BrokenFeed;

    #[async_trait]
    impl CalendarFeed for BrokenFeed {
        async fn list_events(
            &self,
            _spot: Spot,
        ) -> DomainResult<Vec<crate::application::ports::EventWindow>> {
            Err(DomainError::Read("feed unreachable".into()))
        }
    }

    #[tokio::test]
    async fn create_propagates_write_failure() {
        let inner = Arc::new(InMemoryCalendar::new());
        let svc = BookingService::new(
            AvailabilityService::new(inner.clone()),
            Arc::new(FailingStore { inner }),
            WindowPolicy::default(),
            RateCard::default(),
        );

        let err = svc.create(request(Spot::Northern, 2, 26)).await.unwrap_err();
        assert!(matches!(err, DomainError::Write(_)));
    }

    #[tokio::test]
    async fn unreadable_feed_fails_closed() {
        let store = Arc::new(InMemoryCalendar::new());
        let svc = BookingService::new(
            AvailabilityService::new(Arc::new(BrokenFeed)),
            store.clone(),
            WindowPolicy::default(),
            RateCard::default(),
        );

        // A feed failure must never be treated as "available".
        let err = svc.create(request(Spot::Northern, 2, 26)).await.unwrap_err();
        assert!(matches!(err, DomainError::Read(_)));
        assert_eq!(store.event_count(), 0);
    }
}
