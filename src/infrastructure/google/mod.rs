//! Google Calendar adapters: OAuth token provider, store client, ICS feed

pub mod auth;
pub mod calendar;
pub mod feed;

pub use auth::TokenProvider;
pub use calendar::{GoogleCalendarConfig, GoogleCalendarStore};
pub use feed::IcsFeed;
