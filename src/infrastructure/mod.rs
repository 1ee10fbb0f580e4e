//! Infrastructure layer - external concerns

pub mod google;
pub mod ics;
pub mod memory;

pub use google::{GoogleCalendarConfig, GoogleCalendarStore, IcsFeed, TokenProvider};
pub use memory::InMemoryCalendar;
