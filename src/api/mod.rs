//! REST API layer

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod router;

pub use handlers::AppState;
pub use router::create_api_router;
