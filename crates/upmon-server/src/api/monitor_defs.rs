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
    ArgSpec, CreateMonitorDefRequest, DefArgRequest, MonitorDef, UpdateMonitorDefRequest,
};

pub async fn list_defs(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    success_response(StatusCode::OK, &trace_id, state.scheduler.definitions())
}

pub async fn create_def(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateMonitorDefRequest>,
) -> impl IntoResponse {
    let now = Utc::now();
    let def = MonitorDef {
        id: upmon_common::id::next_id(),
        name: req.name,
        active: req.active,
        cmdline_filename: req.cmdline_filename,
        cmdline_args_tmpl: req.cmdline_args_tmpl,
        description_tmpl: req.description_tmpl,
        arg_specs: req.args.into_iter().map(arg_spec_from_request).collect(),
        created_at: now,
        updated_at: now,
    };
    match state.scheduler.create_definition(def.clone()) {
        Ok(()) => success_response(StatusCode::CREATED, &trace_id, def),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn get_def(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(def_id): Path<String>,
) -> impl IntoResponse {
    match state.scheduler.definition(&def_id) {
        Some(def) => success_response(StatusCode::OK, &trace_id, def),
        None => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Monitor definition not found",
        ),
    }
}

pub async fn update_def(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(def_id): Path<String>,
    Json(req): Json<UpdateMonitorDefRequest>,
) -> impl IntoResponse {
    let Some(mut def) = state.scheduler.definition(&def_id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Monitor definition not found",
        );
    };
    if let Some(name) = req.name {
        def.name = name;
    }
    if let Some(active) = req.active {
        def.active = active;
    }
    if let Some(cmdline_filename) = req.cmdline_filename {
        def.cmdline_filename = cmdline_filename;
    }
    if let Some(cmdline_args_tmpl) = req.cmdline_args_tmpl {
        def.cmdline_args_tmpl = cmdline_args_tmpl;
    }
    if let Some(description_tmpl) = req.description_tmpl {
        def.description_tmpl = description_tmpl;
    }
    match state.scheduler.update_definition(def.clone()) {
        Ok(()) => success_response(StatusCode::OK, &trace_id, def),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn delete_def(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(def_id): Path<String>,
) -> impl IntoResponse {
    match state.scheduler.delete_definition(&def_id) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Monitor definition deleted"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn set_def_arg(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(def_id): Path<String>,
    Json(req): Json<DefArgRequest>,
) -> impl IntoResponse {
    let arg = arg_spec_from_request(req);
    match state.scheduler.set_definition_arg(&def_id, arg) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Definition argument set"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

pub async fn delete_def_arg(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((def_id, name)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.scheduler.delete_definition_arg(&def_id, &name) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Definition argument deleted"),
        Err(e) => scheduler_error_response(&trace_id, e),
    }
}

fn arg_spec_from_request(req: DefArgRequest) -> ArgSpec {
    ArgSpec {
        id: upmon_common::id::next_id(),
        display_name: req.display_name.unwrap_or_else(|| req.name.clone()),
        description: req.description.unwrap_or_default(),
        name: req.name,
        required: req.required,
        default_value: req.default_value,
    }
}
