//! API Router with Swagger UI

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::dto::{ApiResponse, WindowDto};
use crate::api::handlers::{availability, bookings, events, health, pricing, AppState};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        availability::check_availability,
        bookings::create_booking,
        bookings::lookup_booking,
        bookings::reschedule_booking,
        bookings::cancel_booking,
        events::list_events,
        pricing::quote,
    ),
    components(schemas(
        ApiResponse<WindowDto>,
        WindowDto,
        health::HealthResponse,
        availability::AvailabilityResponse,
        bookings::BookRequest,
        bookings::BookingResponse,
        bookings::LookupResponse,
        bookings::RescheduleRequest,
        events::EventItem,
        events::EventsResponse,
        pricing::QuoteResponse,
    )),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Availability", description = "Window availability checks"),
        (name = "Bookings", description = "Reservation lifecycle"),
        (name = "Events", description = "Occupancy listings"),
        (name = "Pricing", description = "Price quotes"),
    ),
    info(
        title = "Parking Reservation API",
        description = "Reserves one of two parking spots, with a third-party calendar as the system of record."
    )
)]
struct ApiDoc;

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics.render()
}

/// Build the application router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics))
        .route(
            "/api/v1/availability",
            get(availability::check_availability),
        )
        .route("/api/v1/bookings", axum::routing::post(bookings::create_booking))
        .route(
            "/api/v1/bookings/{ref}",
            get(bookings::lookup_booking)
                .patch(bookings::reschedule_booking)
                .delete(bookings::cancel_booking),
        )
        .route("/api/v1/events", get(events::list_events))
        .route("/api/v1/pricing/quote", get(pricing::quote))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
