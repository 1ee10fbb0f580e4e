//! Common API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TimeWindow;

/// Standard response envelope.
///
/// Success: `{"success": true, "data": {...}}`.
/// Failure: `{"success": false, "error": "..."}`, optionally with
/// `data` carrying failure details (e.g. conflicting windows).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn error_with(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

/// A reservation window, as exposed to callers. Bare start/end only;
/// diagnostics never carry other customers' details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WindowDto {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl From<&TimeWindow> for WindowDto {
    fn from(w: &TimeWindow) -> Self {
        Self {
            start: w.start,
            end: w.end,
        }
    }
}
