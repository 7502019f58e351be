use crate::api::{error_response, success_response, PaginationParams};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListAlertsParams {
    #[serde(default)]
    monitor_id: Option<String>,
    #[serde(default, deserialize_with = "crate::api::deserialize_optional_usize")]
    limit: Option<usize>,
    #[serde(default, deserialize_with = "crate::api::deserialize_optional_usize")]
    offset: Option<usize>,
}

/// Alert history: one row per confirmed DOWN period, newest first.
pub async fn list_alerts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Query(params): Query<ListAlertsParams>,
) -> impl IntoResponse {
    match state.store.list_alerts(
        params.monitor_id.as_deref(),
        PaginationParams::resolve_limit(params.limit),
        PaginationParams::resolve_offset(params.offset),
    ) {
        Ok(alerts) => success_response(StatusCode::OK, &trace_id, alerts),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list alert history");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &trace_id,
                "storage_error",
                "Database error",
            )
        }
    }
}
