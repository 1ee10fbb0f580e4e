pub mod error;
pub mod event_text;
pub mod pricing;
pub mod refcode;
pub mod reservation;
pub mod spot;
pub mod window;

// Re-export commonly used types
pub use error::{DomainError, DomainResult};
pub use pricing::{PriceBreakdown, RateCard};
pub use reservation::{Contact, ReservationDraft, ReservationRecord};
pub use spot::Spot;
pub use window::{parse_timestamp, TimeWindow};
