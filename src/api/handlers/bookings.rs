//! Booking endpoints: create, lookup, reschedule, cancel
//!
//! The reference code in the path is the bearer capability: it is never
//! echoed anywhere except back to the caller who already supplied or
//! received it.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::extract::ValidatedJson;
use crate::api::handlers::{domain_error, parse_spot, parse_time, ApiError, AppState};
use crate::application::BookingRequest;
use crate::domain::Contact;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookRequest {
    /// `northern` or `southern`.
    pub spot: String,
    /// Window start (RFC 3339, or local time in the app timezone).
    pub start: String,
    /// Window end.
    pub end: String,
    #[validate(length(min = 2, max = 16))]
    pub plate: String,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 7, max = 25))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingResponse {
    /// Reference code, the only proof of ownership. Keep it safe.
    #[serde(rename = "ref")]
    pub reference: String,
    pub event_id: String,
    pub price_cents: i64,
    /// Final window as booked. Differs from the request when the start
    /// was bumped off "right now".
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub bumped: bool,
}

/// Book a spot for a time window.
#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = BookRequest,
    responses(
        (status = 200, description = "Reservation created", body = ApiResponse<BookingResponse>),
        (status = 400, description = "Malformed or policy-violating window"),
        (status = 409, description = "Window not available; conflicting windows in data"),
        (status = 422, description = "Field validation failed"),
        (status = 502, description = "Calendar store failure; nothing was persisted")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BookRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let spot = parse_spot(&req.spot)?;
    let start = parse_time(&req.start, state.app_offset)?;
    let end = parse_time(&req.end, state.app_offset)?;

    let confirmation = state
        .booking
        .create(BookingRequest {
            spot,
            start,
            end,
            contact: Contact {
                name: req.name,
                phone: req.phone,
                email: req.email,
            },
            plate: req.plate,
        })
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(BookingResponse {
        reference: confirmation.record.reference,
        event_id: confirmation.record.external_id,
        price_cents: confirmation.price.total_cents,
        start: confirmation.record.window.start,
        end: confirmation.record.window.end,
        bumped: confirmation.bumped,
    })))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SpotQuery {
    /// `northern` or `southern`.
    pub spot: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LookupResponse {
    pub exists: bool,
    #[serde(rename = "ref")]
    pub reference: String,
}

/// Check that a reference code resolves for a spot.
///
/// Existence check only: confirms or denies, never returns the
/// reservation itself.
#[utoipa::path(
    get,
    path = "/api/v1/bookings/{ref}",
    tag = "Bookings",
    params(("ref" = String, Path, description = "Reference code"), SpotQuery),
    responses(
        (status = 200, description = "Reference resolves", body = ApiResponse<LookupResponse>),
        (status = 404, description = "Unknown reference for this spot")
    )
)]
pub async fn lookup_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<ApiResponse<LookupResponse>>, ApiError> {
    let spot = parse_spot(&query.spot)?;

    let exists = state
        .booking
        .lookup(spot, &reference)
        .await
        .map_err(domain_error)?;
    if !exists {
        return Err((
            axum::http::StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Not found")),
        ));
    }

    Ok(Json(ApiResponse::success(LookupResponse {
        exists: true,
        reference: reference.to_uppercase(),
    })))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RescheduleRequest {
    /// `northern` or `southern`.
    pub spot: String,
    /// New window start.
    pub start: String,
    /// New window end.
    pub end: String,
}

/// Move an existing reservation to a new window.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/{ref}",
    tag = "Bookings",
    params(("ref" = String, Path, description = "Reference code")),
    request_body = RescheduleRequest,
    responses(
        (status = 200, description = "Reservation moved", body = ApiResponse<String>),
        (status = 400, description = "Malformed or policy-violating window"),
        (status = 404, description = "Unknown reference for this spot"),
        (status = 409, description = "New window not available"),
        (status = 502, description = "Calendar store failure")
    )
)]
pub async fn reschedule_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    ValidatedJson(req): ValidatedJson<RescheduleRequest>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let spot = parse_spot(&req.spot)?;
    let start = parse_time(&req.start, state.app_offset)?;
    let end = parse_time(&req.end, state.app_offset)?;

    state
        .booking
        .reschedule(spot, &reference, start, end)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success("Reservation rescheduled".to_string())))
}

/// Cancel a reservation.
#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{ref}",
    tag = "Bookings",
    params(("ref" = String, Path, description = "Reference code"), SpotQuery),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<String>),
        (status = 404, description = "Unknown reference for this spot"),
        (status = 502, description = "Calendar store failure")
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<SpotQuery>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let spot = parse_spot(&query.spot)?;

    state
        .booking
        .cancel(spot, &reference)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success("Reservation cancelled".to_string())))
}
