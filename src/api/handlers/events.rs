//! Occupancy listing endpoint
//!
//! Feeds the calendar view in the UI. Reference codes are deliberately
//! absent from the listing: the code is the capability to mutate a
//! reservation, and third parties only get to see that a window is
//! taken.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::dto::ApiResponse;
use crate::api::handlers::{bad_request, domain_error, parse_time, ApiError, AppState};
use crate::domain::Spot;

#[derive(Debug, Deserialize, IntoParams)]
pub struct EventsParams {
    /// `northern`, `southern`, or `both` (default).
    pub spot: Option<String>,
    /// Clip the listing to entries ending at or after this instant.
    pub start: Option<String>,
    /// Clip the listing to entries starting at or before this instant.
    pub end: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventItem {
    pub spot: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub name: Option<String>,
    pub plate: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventsResponse {
    pub events: Vec<EventItem>,
}

/// List reserved windows for one or both spots.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    params(EventsParams),
    responses(
        (status = 200, description = "Occupancy listing", body = ApiResponse<EventsResponse>),
        (status = 400, description = "Malformed spot or timestamps"),
        (status = 502, description = "Calendar feed unreachable")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventsParams>,
) -> Result<Json<ApiResponse<EventsResponse>>, ApiError> {
    let spots: Vec<Spot> = match params.spot.as_deref() {
        None | Some("both") => Spot::ALL.to_vec(),
        Some(raw) => vec![raw
            .parse()
            .map_err(|_| bad_request(format!("unknown spot: {raw}")))?],
    };

    let from = params
        .start
        .as_deref()
        .map(|raw| parse_time(raw, state.app_offset))
        .transpose()?;
    let until = params
        .end
        .as_deref()
        .map(|raw| parse_time(raw, state.app_offset))
        .transpose()?;

    let entries = state
        .availability
        .list_occupancy(&spots, from, until)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(EventsResponse {
        events: entries
            .into_iter()
            .map(|e| EventItem {
                spot: e.spot.to_string(),
                start: e.window.start,
                end: e.window.end,
                name: e.name,
                plate: e.plate,
            })
            .collect(),
    })))
}
