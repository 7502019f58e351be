mod common;

use common::*;
use serde_json::json;
use upmon_server::config::ServerConfig;

#[tokio::test]
async fn monitor_lifecycle_over_http() {
    let ctx = build_test_context().unwrap();

    // Create a definition
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/monitor_defs",
        Some(json!({
            "name": "http",
            "cmdline_filename": "/usr/lib/nagios/plugins/check_http",
            "cmdline_args_tmpl": "-H {{host}} -p {{port}}",
            "description_tmpl": "HTTP check of {{host}}",
            "args": [
                {"name": "host", "required": true},
                {"name": "port", "default_value": "80"}
            ]
        })),
    )
    .await
    .unwrap();
    assert_eq!(status, 201);
    assert_eq!(body["err_code"], 0);
    let def_id = body["data"]["id"].as_str().unwrap().to_string();

    // Create a monitor for it
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/monitors",
        Some(json!({
            "def_id": def_id,
            "args": {"host": "web-01.example.com"},
            "interval_secs": 60,
            "threshold": 2,
            "metadata": {"owner": "noc"}
        })),
    )
    .await
    .unwrap();
    assert_eq!(status, 201);
    let monitor = &body["data"];
    let monitor_id = monitor["id"].as_str().unwrap().to_string();
    assert_eq!(monitor["description"], "HTTP check of web-01.example.com");
    assert_eq!(monitor["threshold"], 2);
    assert_eq!(monitor["state"]["announced"], "unknown");

    // The definition is now in use and cannot be deleted
    let (status, body) = request(&ctx.app, "DELETE", &format!("/v1/monitor_defs/{def_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, 409);
    assert_eq!(body["err_code"], 1005);

    // List and fetch
    let (status, body) = request(&ctx.app, "GET", "/v1/monitors", None).await.unwrap();
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Disable checks
    let (status, _) = request(
        &ctx.app,
        "PUT",
        &format!("/v1/monitors/{monitor_id}/checks"),
        Some(json!({"enabled": false})),
    )
    .await
    .unwrap();
    assert_eq!(status, 200);
    let (_, body) = request(&ctx.app, "GET", &format!("/v1/monitors/{monitor_id}"), None)
        .await
        .unwrap();
    assert_eq!(body["data"]["checks_enabled"], false);

    // Update the interval
    let (status, _) = request(
        &ctx.app,
        "PUT",
        &format!("/v1/monitors/{monitor_id}/interval"),
        Some(json!({"interval_secs": 30})),
    )
    .await
    .unwrap();
    assert_eq!(status, 200);

    // Delete the monitor, then the definition
    let (status, _) = request(&ctx.app, "DELETE", &format!("/v1/monitors/{monitor_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, 200);
    let (_, body) = request(&ctx.app, "GET", "/v1/monitors", None).await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = request(&ctx.app, "DELETE", &format!("/v1/monitor_defs/{def_id}"), None)
        .await
        .unwrap();
    assert_eq!(status, 200);
}

#[tokio::test]
async fn invalid_monitor_arguments_are_a_client_error() {
    let ctx = build_test_context().unwrap();
    let def = http_def();
    ctx.state.scheduler.create_definition(def.clone()).unwrap();

    // Missing required argument
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/monitors",
        Some(json!({"def_id": def.id, "args": {}})),
    )
    .await
    .unwrap();
    assert_eq!(status, 400);
    assert_eq!(body["err_code"], 1101);
    assert!(body["err_msg"]
        .as_str()
        .unwrap()
        .contains("missing required argument"));

    // Unknown definition
    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/monitors",
        Some(json!({"def_id": "no-such-def", "args": {"host": "x"}})),
    )
    .await
    .unwrap();
    assert_eq!(status, 404);
    assert_eq!(body["err_code"], 1004);
}

#[tokio::test]
async fn unknown_monitor_operations_return_404_envelope() {
    let ctx = build_test_context().unwrap();
    let (status, body) = request(
        &ctx.app,
        "PUT",
        "/v1/monitors/no-such-monitor/interval",
        Some(json!({"interval_secs": 60})),
    )
    .await
    .unwrap();
    assert_eq!(status, 404);
    assert_eq!(body["err_code"], 1004);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn definition_args_can_be_managed_over_http() {
    let ctx = build_test_context().unwrap();
    let def = http_def();
    ctx.state.scheduler.create_definition(def.clone()).unwrap();

    let (status, _) = request(
        &ctx.app,
        "PUT",
        &format!("/v1/monitor_defs/{}/args", def.id),
        Some(json!({"name": "timeout", "default_value": "10"})),
    )
    .await
    .unwrap();
    assert_eq!(status, 200);

    let (_, body) = request(&ctx.app, "GET", &format!("/v1/monitor_defs/{}", def.id), None)
        .await
        .unwrap();
    let args = body["data"]["arg_specs"].as_array().unwrap();
    assert!(args.iter().any(|a| a["name"] == "timeout"));

    let (status, _) = request(
        &ctx.app,
        "DELETE",
        &format!("/v1/monitor_defs/{}/args/timeout", def.id),
        None,
    )
    .await
    .unwrap();
    assert_eq!(status, 200);

    let (_, body) = request(&ctx.app, "GET", &format!("/v1/monitor_defs/{}", def.id), None)
        .await
        .unwrap();
    let args = body["data"]["arg_specs"].as_array().unwrap();
    assert!(args.iter().all(|a| a["name"] != "timeout"));
}

#[tokio::test]
async fn contacts_attach_and_detach() {
    let ctx = build_test_context().unwrap();
    let def = http_def();
    ctx.state.scheduler.create_definition(def.clone()).unwrap();
    let config = monitor_config(&def.id, 3);
    let monitor_id = config.id.clone();
    ctx.state.scheduler.activate_monitor(config).unwrap();

    let (status, body) = request(
        &ctx.app,
        "POST",
        "/v1/contacts",
        Some(json!({"name": "oncall", "email": "oncall@example.com"})),
    )
    .await
    .unwrap();
    assert_eq!(status, 201);
    let contact_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &ctx.app,
        "POST",
        &format!("/v1/monitors/{monitor_id}/contacts/{contact_id}"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(status, 200);
    let resolved = ctx.state.store.contacts_for_monitor(&monitor_id).unwrap();
    assert_eq!(resolved.len(), 1);

    // Attaching to a missing monitor is a 404
    let (status, _) = request(
        &ctx.app,
        "POST",
        &format!("/v1/monitors/no-such/contacts/{contact_id}"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(status, 404);

    let (status, _) = request(
        &ctx.app,
        "DELETE",
        &format!("/v1/monitors/{monitor_id}/contacts/{contact_id}"),
        None,
    )
    .await
    .unwrap();
    assert_eq!(status, 200);
    assert!(ctx
        .state
        .store
        .contacts_for_monitor(&monitor_id)
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn system_status_reports_scheduler_counters() {
    let ctx = build_test_context().unwrap();
    let def = http_def();
    ctx.state.scheduler.create_definition(def.clone()).unwrap();
    ctx.state
        .scheduler
        .activate_monitor(monitor_config(&def.id, 3))
        .unwrap();

    let (status, body) = request(&ctx.app, "GET", "/v1/system/status", None)
        .await
        .unwrap();
    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["monitors"], 1);
    assert_eq!(data["running_checks"], 0);
    assert_eq!(data["total_checks"], 0);
    assert!(data["invalid_monitors"].as_object().unwrap().is_empty());
    assert_eq!(data["available_permits"], 200);
}

#[tokio::test]
async fn alert_history_is_listable() {
    let ctx = build_test_context().unwrap();
    let (status, body) = request(&ctx.app, "GET", "/v1/alerts", None).await.unwrap();
    assert_eq!(status, 200);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn api_key_is_enforced_when_configured() {
    let mut config = ServerConfig::default();
    config.api_key = Some("sekrit".to_string());
    let ctx = build_test_context_with(
        std::sync::Arc::new(StaticExecutor::new(upmon_common::types::MonitorState::Up)),
        config,
        vec![],
    )
    .unwrap();

    let (status, body) = request(&ctx.app, "GET", "/v1/monitors", None).await.unwrap();
    assert_eq!(status, 401);
    assert_eq!(body["err_code"], 1002);

    let (status, _) = request_with_headers(
        &ctx.app,
        "GET",
        "/v1/monitors",
        None,
        &[("x-api-key", "sekrit")],
    )
    .await
    .unwrap();
    assert_eq!(status, 200);
}
