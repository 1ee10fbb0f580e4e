//! Reservation entities

use crate::domain::{Spot, TimeWindow};

/// Who booked the spot. Carried for the calendar event body only;
/// ownership is proven by the reference code, not by identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// A reservation about to be written to the store.
///
/// The store assigns the external id at creation, turning a draft into
/// a [`ReservationRecord`].
#[derive(Debug, Clone)]
pub struct ReservationDraft {
    pub spot: Spot,
    pub window: TimeWindow,
    pub reference: String,
    pub contact: Contact,
    pub plate: String,
}

/// The unit of truth, materialized as one calendar event.
#[derive(Debug, Clone)]
pub struct ReservationRecord {
    pub spot: Spot,
    pub window: TimeWindow,
    pub reference: String,
    pub contact: Contact,
    pub plate: String,
    /// Opaque handle assigned by the store; required for update/delete.
    pub external_id: String,
}

impl ReservationDraft {
    pub fn into_record(self, external_id: String) -> ReservationRecord {
        ReservationRecord {
            spot: self.spot,
            window: self.window,
            reference: self.reference,
            contact: self.contact,
            plate: self.plate,
            external_id,
        }
    }
}
