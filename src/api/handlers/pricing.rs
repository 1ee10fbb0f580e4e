//! Price quote endpoint
//!
//! Pure computation over the configured rate card; shows the cost
//! estimate before a booking is attempted. No availability check and
//! no side effects.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::dto::ApiResponse;
use crate::api::handlers::{parse_time, ApiError, AppState};
use crate::domain::TimeWindow;

#[derive(Debug, Deserialize, IntoParams)]
pub struct QuoteParams {
    /// Window start (RFC 3339, or local time in the app timezone).
    pub start: String,
    /// Window end.
    pub end: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub total_cents: i64,
    /// Dollar rendering of the total, e.g. `$15.00`.
    pub formatted_total: String,
}

/// Quote the price for a window under the tiered rate scheme.
#[utoipa::path(
    get,
    path = "/api/v1/pricing/quote",
    tag = "Pricing",
    params(QuoteParams),
    responses(
        (status = 200, description = "Cheapest unit decomposition", body = ApiResponse<QuoteResponse>),
        (status = 400, description = "Malformed timestamps")
    )
)]
pub async fn quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let start = parse_time(&params.start, state.app_offset)?;
    let end = parse_time(&params.end, state.app_offset)?;

    let breakdown = state.rates.quote(&TimeWindow::new(start, end));

    Ok(Json(ApiResponse::success(QuoteResponse {
        months: breakdown.months,
        weeks: breakdown.weeks,
        days: breakdown.days,
        total_cents: breakdown.total_cents,
        formatted_total: breakdown.format_total(),
    })))
}
