//! API Handlers

pub mod availability;
pub mod bookings;
pub mod events;
pub mod health;
pub mod pricing;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, FixedOffset, Utc};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::api::dto::{ApiResponse, WindowDto};
use crate::application::{AvailabilityService, BookingService};
use crate::domain::{parse_timestamp, DomainError, RateCard, Spot};

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub booking: Arc<BookingService>,
    pub availability: Arc<AvailabilityService>,
    pub rates: RateCard,
    /// Application timezone, applied to offset-less timestamps.
    pub app_offset: FixedOffset,
    pub metrics: PrometheusHandle,
}

/// Uniform error shape: the envelope's `data` slot carries conflicting
/// windows on 409, and is empty otherwise.
pub(crate) type ApiError = (StatusCode, Json<ApiResponse<Vec<WindowDto>>>);

pub(crate) fn domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, Json(ApiResponse::error(msg))),
        DomainError::Conflict(conflicts) => {
            let windows: Vec<WindowDto> = conflicts.iter().map(WindowDto::from).collect();
            (
                StatusCode::CONFLICT,
                Json(ApiResponse::error_with(windows, "Time not available")),
            )
        }
        DomainError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Not found")),
        ),
        err @ (DomainError::Read(_) | DomainError::Write(_) | DomainError::Auth(_)) => {
            metrics::counter!("collaborator_failures_total").increment(1);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(err.to_string())),
            )
        }
    }
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

pub(crate) fn parse_spot(raw: &str) -> Result<Spot, ApiError> {
    raw.parse()
        .map_err(|_| bad_request(format!("unknown spot: {raw}")))
}

pub(crate) fn parse_time(raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>, ApiError> {
    parse_timestamp(raw, offset).map_err(domain_error)
}

// ── Tests ──────────────────────────────────────────────────────
