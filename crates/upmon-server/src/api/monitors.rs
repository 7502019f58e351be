use crate::api::{
    error_response, scheduler_error_response, success_empty_response, success_response,
};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use upmon_common::types::{
    CreateMonitorRequest, MonitorConfig, SetEnabledRequest, UpdateIntervalRequest,
    UpdateMonitorArgsRequest, UpdateThresholdRequest,
};

pub async fn list_monitors(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    success_response(StatusCode::OK, &trace_id, state.scheduler.snapshots())
}

pub async fn create_monitor(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateMonitorRequest>,
) -> impl IntoResponse {
    let now = Utc::now();
    let config = MonitorConfig {
        id: upmon_common::id::next_id(),
        def_id: req.def_id,
        interval_secs: req
            .interval_secs
            .unwrap_or(state.config.scheduler.default_interval_secs),
        threshold: req
            .threshold
            .unwrap_or(state.config.scheduler.default_threshold),
        checks_enabled: true,
        alerts_enabled: true,
        args: req.args,
        metadata: req.metadata,
        created_at: now,
        updated_at: now,
    };
    let monitor_id = config.id.clone();
    match state.scheduler.activate_monitor(config) {
        Ok(()) => match state.scheduler.snapshot(&monitor_id) {
            Some(snapshot) => success_response(StatusCode::CREATED, &trace_id, snapshot),
            None => success_empty_response(StatusCode::CREATED, &trace_id, "Monitor created"),
        },
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn get_monitor(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
) -> impl IntoResponse {
    match state.scheduler.snapshot(&monitor_id) {
        Some(snapshot) => success_response(StatusCode::OK, &trace_id, snapshot),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Monitor not found or excluded from scheduling",
        ),
    }
}

pub async fn delete_monitor(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
) -> impl IntoResponse {
    match state.scheduler.remove_monitor(&monitor_id) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor deleted"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn update_monitor_args(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
    Json(req): Json<UpdateMonitorArgsRequest>,
) -> impl IntoResponse {
    match state.scheduler.update_monitor_args(&monitor_id, req.args) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor arguments updated"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn set_checks_enabled(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> impl IntoResponse {
    match state.scheduler.set_checks_enabled(&monitor_id, req.enabled) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor checks updated"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn set_alerts_enabled(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> impl IntoResponse {
    match state.scheduler.set_alerts_enabled(&monitor_id, req.enabled) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor alerts updated"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn set_interval(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
    Json(req): Json<UpdateIntervalRequest>,
) -> impl IntoResponse {
    if req.interval_secs == 0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "interval_secs must be at least 1",
        );
    }
    match state.scheduler.set_interval(&monitor_id, req.interval_secs) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor interval updated"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn set_threshold(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
    Json(req): Json<UpdateThresholdRequest>,
) -> impl IntoResponse {
    if req.threshold == 0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            &trace_id,
            "bad_request",
            "threshold must be at least 1",
        );
    }
    match state.scheduler.set_threshold(&monitor_id, req.threshold) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor threshold updated"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn check_now(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(monitor_id): Path<String>,
) -> impl IntoResponse {
    match state.scheduler.check_now(&monitor_id) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Check scheduled"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}
