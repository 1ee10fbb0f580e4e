//! Availability endpoint

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::dto::{ApiResponse, WindowDto};
use crate::api::handlers::{domain_error, parse_spot, parse_time, ApiError, AppState};
use crate::domain::TimeWindow;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityParams {
    /// `northern` or `southern`.
    pub spot: String,
    /// Window start (RFC 3339, or local time in the app timezone).
    pub start: String,
    /// Window end.
    pub end: String,
    /// Reference code to ignore, for "is this free if I move my own
    /// booking there" checks.
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub available: bool,
    /// Occupied windows clashing with the candidate.
    pub conflicts: Vec<WindowDto>,
}

/// Check whether a window is free for a spot.
#[utoipa::path(
    get,
    path = "/api/v1/availability",
    tag = "Availability",
    params(AvailabilityParams),
    responses(
        (status = 200, description = "Availability verdict", body = ApiResponse<AvailabilityResponse>),
        (status = 400, description = "Malformed spot or timestamps"),
        (status = 502, description = "Calendar feed unreachable")
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<ApiResponse<AvailabilityResponse>>, ApiError> {
    let spot = parse_spot(&params.spot)?;
    let start = parse_time(&params.start, state.app_offset)?;
    let end = parse_time(&params.end, state.app_offset)?;

    let result = state
        .availability
        .check(spot, &TimeWindow::new(start, end), params.exclude.as_deref())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(AvailabilityResponse {
        available: result.available,
        conflicts: result.conflicts.iter().map(WindowDto::from).collect(),
    })))
}
