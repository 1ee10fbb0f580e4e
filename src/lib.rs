//! # Beatrice Street Parking Reservations
//!
//! Booking service for two exclusive parking spots, with a third-party
//! calendar per spot acting as both the system of record and the
//! conflict-detection source.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core entities, pricing, window math, error taxonomy
//! - **application**: Use cases (availability oracle, booking
//!   coordinator, reference resolver) and outbound port traits
//! - **infrastructure**: Calendar store client, ICS feed reader,
//!   in-memory calendar for tests
//! - **api**: REST API with Swagger documentation
//!
//! There is no private database. Every invariant (no double-booking,
//! no touching someone else's reservation) is enforced by re-reading
//! the external calendar immediately before each write; see
//! [`application::booking`] for the consistency trade-offs.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export API router
pub use api::{create_api_router, AppState};
