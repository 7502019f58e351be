use crate::state::AppState;
use crate::{api, events_ws, logging, middleware as upmon_middleware};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub fn build_http_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/v1/monitor_defs",
            get(api::monitor_defs::list_defs).post(api::monitor_defs::create_def),
        )
        .route(
            "/v1/monitor_defs/{id}",
            get(api::monitor_defs::get_def)
                .put(api::monitor_defs::update_def)
                .delete(api::monitor_defs::delete_def),
        )
        .route(
            "/v1/monitor_defs/{id}/args",
            put(api::monitor_defs::set_def_arg),
        )
        .route(
            "/v1/monitor_defs/{id}/args/{name}",
            axum::routing::delete(api::monitor_defs::delete_def_arg),
        )
        .route(
            "/v1/monitors",
            get(api::monitors::list_monitors).post(api::monitors::create_monitor),
        )
        .route(
            "/v1/monitors/{id}",
            get(api::monitors::get_monitor).delete(api::monitors::delete_monitor),
        )
        .route(
            "/v1/monitors/{id}/args",
            put(api::monitors::update_monitor_args),
        )
        .route(
            "/v1/monitors/{id}/checks",
            put(api::monitors::set_checks_enabled),
        )
        .route(
            "/v1/monitors/{id}/alerts",
            put(api::monitors::set_alerts_enabled),
        )
        .route("/v1/monitors/{id}/interval", put(api::monitors::set_interval))
        .route(
            "/v1/monitors/{id}/threshold",
            put(api::monitors::set_threshold),
        )
        .route("/v1/monitors/{id}/check_now", post(api::monitors::check_now))
        .route(
            "/v1/monitors/{id}/contacts/{contact_id}",
            post(api::contacts::attach_contact).delete(api::contacts::detach_contact),
        )
        .route(
            "/v1/contacts",
            get(api::contacts::list_contacts).post(api::contacts::create_contact),
        )
        .route(
            "/v1/contacts/{id}",
            axum::routing::delete(api::contacts::delete_contact),
        )
        .route("/v1/alerts", get(api::alerts::list_alerts))
        .route("/v1/system/status", get(api::system::status))
        .route("/v1/events/ws", get(events_ws::events_ws))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            upmon_middleware::api_key_middleware,
        ))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(logging::request_logging))
}
