use crate::api::success_response;
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

#[derive(Serialize)]
pub struct SystemStatus {
    pub uptime_secs: i64,
    pub monitors: usize,
    /// Monitors excluded from scheduling, with their configuration errors.
    pub invalid_monitors: HashMap<String, String>,
    pub running_checks: usize,
    pub available_permits: usize,
    pub event_subscribers: usize,
    pub total_checks: u64,
    pub deferred_submissions: u64,
    pub checks_up: u64,
    pub checks_down: u64,
    pub checks_unknown: u64,
}

pub async fn status(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let stats = &state.scheduler.stats;
    let status = SystemStatus {
        uptime_secs: (Utc::now() - state.start_time).num_seconds(),
        monitors: state.scheduler.monitor_count(),
        invalid_monitors: state.scheduler.invalid_monitors(),
        running_checks: state.scheduler.running_count(),
        available_permits: state.scheduler.available_permits(),
        event_subscribers: state.broker.subscriber_count(),
        total_checks: stats.total_checks.load(Ordering::Relaxed),
        deferred_submissions: stats.deferred.load(Ordering::Relaxed),
        checks_up: stats.checks_up.load(Ordering::Relaxed),
        checks_down: stats.checks_down.load(Ordering::Relaxed),
        checks_unknown: stats.checks_unknown.load(Ordering::Relaxed),
    };
    success_response(StatusCode::OK, &trace_id, status)
}
