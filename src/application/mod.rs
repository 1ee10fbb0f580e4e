//! Application layer - use cases and outbound ports

pub mod availability;
pub mod booking;
pub mod normalize;
pub mod ports;
pub mod resolver;

pub use availability::{AvailabilityResult, AvailabilityService, OccupancyEntry};
pub use booking::{BookingConfirmation, BookingRequest, BookingService};
pub use normalize::{NormalizedWindow, WindowPolicy};
pub use ports::{CalendarFeed, CalendarStore, EventWindow, StoredEvent};
pub use resolver::ReferenceResolver;
