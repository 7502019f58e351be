use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error_response;
use crate::logging::TraceId;
use crate::state::AppState;

/// Header carrying the static API key.
static API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Middleware that validates the `X-Api-Key` request header.
///
/// When `api_key` is set in config, requests without the matching header
/// are rejected with 401 Unauthorized. When unset, all requests pass
/// through.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = &state.config.api_key else {
        return next.run(req).await;
    };

    let trace_id = req
        .extensions()
        .get::<TraceId>()
        .cloned()
        .unwrap_or_else(|| TraceId(String::new()));

    let provided = req
        .headers()
        .get(&API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => next.run(req).await,
        _ => error_response(
            StatusCode::UNAUTHORIZED,
            &trace_id,
            "unauthorized",
            "Missing or invalid API key",
        ),
    }
}
