use crate::api::{error_response, success_empty_response, success_response};
use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use upmon_common::types::{Contact, CreateContactRequest};

fn storage_error(trace_id: &TraceId, e: upmon_storage::StorageError) -> Response {
    tracing::error!(error = %e, "Storage error while handling contact request");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        trace_id,
        "storage_error",
        "Database error",
    )
}

pub async fn list_contacts(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match state.store.list_contacts() {
        Ok(contacts) => success_response(StatusCode::OK, &trace_id, contacts),
        Err(e) => storage_error(&trace_id, e),
    }
}

pub async fn create_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> impl IntoResponse {
    let now = Utc::now();
    let contact = Contact {
        id: upmon_common::id::next_id(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        active: req.active,
        created_at: now,
        updated_at: now,
    };
    match state.store.insert_contact(&contact) {
        Ok(()) => success_response(StatusCode::CREATED, &trace_id, contact),
        Err(e) => storage_error(&trace_id, e),
    }
}

pub async fn delete_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path(contact_id): Path<String>,
) -> impl IntoResponse {
    match state.store.delete_contact(&contact_id) {
        Ok(true) => success_empty_response(StatusCode::OK, &trace_id, "Contact deleted"),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Contact not found",
        ),
        Err(e) => storage_error(&trace_id, e),
    }
}

pub async fn attach_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((monitor_id, contact_id)): Path<(String, String)>,
) -> impl IntoResponse {
    if !state.scheduler.has_monitor(&monitor_id) {
        return error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Monitor not found",
        );
    }
    let contact_exists = match state.store.list_contacts() {
        Ok(contacts) => contacts.iter().any(|c| c.id == contact_id),
        Err(e) => return storage_error(&trace_id, e),
    };
    if !contact_exists {
        return error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Contact not found",
        );
    }
    match state.store.attach_contact(&monitor_id, &contact_id) {
        Ok(()) => success_empty_response(StatusCode::OK, &trace_id, "Contact attached"),
        Err(e) => storage_error(&trace_id, e),
    }
}

pub async fn detach_contact(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
    Path((monitor_id, contact_id)): Path<(String, String)>,
) -> impl IntoResponse {
    match state.store.detach_contact(&monitor_id, &contact_id) {
        Ok(true) => success_empty_response(StatusCode::OK, &trace_id, "Contact detached"),
        Ok(false) => error_response(
            StatusCode::NOT_FOUND,
            &trace_id,
            "not_found",
            "Contact is not attached to this monitor",
        ),
        Err(e) => storage_error(&trace_id, e),
    }
}
