pub mod alerts;
pub mod contacts;
pub mod monitor_defs;
pub mod monitors;
pub mod system;

use crate::logging::TraceId;
use crate::scheduler::SchedulerError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API response envelope.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// Error code (0 on success).
    pub err_code: i32,
    /// Error message ("success" on success).
    pub err_msg: String,
    /// Request trace ID.
    pub trace_id: String,
    /// Payload (present on success with data).
    pub data: Option<T>,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub fn success_empty_response(status: StatusCode, trace_id: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: 0,
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

fn to_custom_error_code(code: &str) -> i32 {
    match code {
        "bad_request" => 1001,
        "unauthorized" => 1002,
        "not_found" => 1004,
        "conflict" => 1005,
        "invalid_arguments" => 1101,
        "internal_error" => 1500,
        "storage_error" => 1501,
        _ => 1999,
    }
}

pub fn error_response(status: StatusCode, trace_id: &str, code: &str, msg: &str) -> Response {
    (
        status,
        Json(ApiResponse::<Value> {
            err_code: to_custom_error_code(code),
            err_msg: msg.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

/// Map scheduler errors onto the API envelope.
pub fn scheduler_error_response(trace_id: &TraceId, err: SchedulerError) -> Response {
    match &err {
        SchedulerError::UnknownMonitor(_) | SchedulerError::UnknownDefinition(_) => {
            error_response(StatusCode::NOT_FOUND, trace_id, "not_found", &err.to_string())
        }
        SchedulerError::DefinitionInUse(_) => {
            error_response(StatusCode::CONFLICT, trace_id, "conflict", &err.to_string())
        }
        SchedulerError::InvalidArguments(_) => error_response(
            StatusCode::BAD_REQUEST,
            trace_id,
            "invalid_arguments",
            &err.to_string(),
        ),
        SchedulerError::Storage(e) => {
            tracing::error!(error = %e, "Storage error while handling API request");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}

/// Pagination defaults shared by list endpoints.
pub struct PaginationParams;

impl PaginationParams {
    const DEFAULT_LIMIT: usize = 20;
    const MAX_LIMIT: usize = 1000;

    pub fn resolve_limit(limit: Option<usize>) -> usize {
        limit.unwrap_or(Self::DEFAULT_LIMIT).min(Self::MAX_LIMIT)
    }

    pub fn resolve_offset(offset: Option<usize>) -> usize {
        offset.unwrap_or(0)
    }
}

/// Query-string numbers arrive as strings; deserialize them leniently
/// (empty string counts as absent).
pub fn deserialize_optional_usize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
