use crate::args::{self, ArgError};
use crate::event::{EventBroker, EventCategory, MonitorEvent};
use crate::runner::{CheckExecutor, PluginRunner};
use crate::transition;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use upmon_common::types::{ArgSpec, CheckResult, MonitorState, StateRecord};

fn make_result(state: MonitorState, message: &str) -> CheckResult {
    CheckResult {
        state,
        message: message.to_string(),
        duration_ms: 12,
        exit_code: Some(0),
        timestamp: Utc::now(),
    }
}

fn make_record(announced: MonitorState, candidate: MonitorState, consecutive: u32) -> StateRecord {
    StateRecord {
        announced,
        candidate,
        consecutive,
        state_since: Utc::now() - chrono::Duration::seconds(600),
        last_message: String::new(),
    }
}

fn make_spec(name: &str, required: bool, default_value: &str) -> ArgSpec {
    ArgSpec {
        id: upmon_common::id::next_id(),
        name: name.to_string(),
        display_name: name.to_string(),
        description: String::new(),
        required,
        default_value: default_value.to_string(),
    }
}

// ---- state machine ----

#[test]
fn recovery_confirmed_on_third_agreeing_check() {
    let mut record = make_record(MonitorState::Down, MonitorState::Down, 1);
    let now = Utc::now();

    for i in 0..2 {
        let (next, transition) =
            transition::apply(&record, &make_result(MonitorState::Up, "ok"), 3, now);
        assert!(transition.is_none(), "no alert after {} up checks", i + 1);
        record = next;
    }

    let (next, transition) = transition::apply(&record, &make_result(MonitorState::Up, "ok"), 3, now);
    let transition = transition.expect("third agreeing check confirms the transition");
    assert_eq!(transition.previous, MonitorState::Down);
    assert!(transition.previous_duration_secs >= 600);
    assert_eq!(next.announced, MonitorState::Up);
    assert_eq!(next.candidate, MonitorState::Up);
    assert_eq!(next.consecutive, 1);
}

#[test]
fn flapping_checks_never_alert() {
    let mut record = make_record(MonitorState::Up, MonitorState::Up, 1);
    let now = Utc::now();

    for state in [MonitorState::Down, MonitorState::Up, MonitorState::Down] {
        let (next, transition) = transition::apply(&record, &make_result(state, "flap"), 3, now);
        assert!(transition.is_none());
        record = next;
    }

    assert_eq!(record.announced, MonitorState::Up);
    assert_eq!(record.consecutive, 1, "disagreement resets the count");
}

#[test]
fn threshold_one_flips_immediately() {
    let record = make_record(MonitorState::Up, MonitorState::Up, 1);
    let (next, transition) = transition::apply(
        &record,
        &make_result(MonitorState::Down, "connection refused"),
        1,
        Utc::now(),
    );
    assert!(transition.is_some());
    assert_eq!(next.announced, MonitorState::Down);
    assert_eq!(next.last_message, "connection refused");
}

#[test]
fn unknown_becomes_announced_state() {
    // A monitor that cannot be checked must eventually be reported as
    // unknown instead of holding its last known-good state forever.
    let mut record = make_record(MonitorState::Up, MonitorState::Up, 1);
    let now = Utc::now();
    let mut alerts = 0;

    for _ in 0..3 {
        let (next, transition) =
            transition::apply(&record, &make_result(MonitorState::Unknown, "timed out"), 3, now);
        if transition.is_some() {
            alerts += 1;
        }
        record = next;
    }

    assert_eq!(alerts, 1);
    assert_eq!(record.announced, MonitorState::Unknown);
}

#[test]
fn agreeing_checks_after_confirmation_keep_counting() {
    let record = make_record(MonitorState::Down, MonitorState::Up, 2);
    let now = Utc::now();

    let (record, transition) =
        transition::apply(&record, &make_result(MonitorState::Up, "ok"), 3, now);
    assert!(transition.is_some());

    // The confirmed state anchors counting for the next potential flip.
    let (record, transition) = transition::apply(&record, &make_result(MonitorState::Up, "ok"), 3, now);
    assert!(transition.is_none());
    assert_eq!(record.consecutive, 2);
    assert_eq!(record.announced, MonitorState::Up);
}

// ---- argument expansion ----

#[test]
fn expand_merges_defaults_and_overrides() {
    let specs = vec![
        make_spec("host", true, ""),
        make_spec("port", false, "80"),
        make_spec("warn", false, "3"),
    ];
    let mut overrides = HashMap::new();
    overrides.insert("host".to_string(), "web-01.example.com".to_string());
    overrides.insert("warn".to_string(), "5".to_string());

    let argv = args::expand_cmdline("-H {{host}} -p {{port}} -w {{warn}}", &specs, &overrides)
        .expect("expansion should succeed");
    assert_eq!(argv, vec!["-H", "web-01.example.com", "-p", "80", "-w", "5"]);
}

#[test]
fn expansion_is_idempotent() {
    let specs = vec![make_spec("host", true, "")];
    let mut overrides = HashMap::new();
    overrides.insert("host".to_string(), "db-01".to_string());

    let first = args::expand_cmdline("-H {{host}}", &specs, &overrides).unwrap();
    let second = args::expand_cmdline("-H {{host}}", &specs, &overrides).unwrap();
    assert_eq!(first, second);
}

#[test]
fn missing_required_argument_is_rejected() {
    let specs = vec![make_spec("host", true, "")];
    let err = args::expand_cmdline("-H {{host}}", &specs, &HashMap::new()).unwrap_err();
    assert_eq!(err, ArgError::MissingArgument("host".to_string()));
}

#[test]
fn unknown_argument_is_rejected() {
    let specs = vec![make_spec("host", false, "localhost")];
    let mut overrides = HashMap::new();
    overrides.insert("hostname".to_string(), "web-01".to_string());
    let err = args::expand_cmdline("-H {{host}}", &specs, &overrides).unwrap_err();
    assert_eq!(err, ArgError::UnknownArgument("hostname".to_string()));
}

#[test]
fn unresolved_placeholder_is_rejected() {
    let specs = vec![make_spec("host", false, "localhost")];
    let err = args::expand_cmdline("-H {{host}} -u {{url}}", &specs, &HashMap::new()).unwrap_err();
    assert_eq!(err, ArgError::UnresolvedPlaceholder("url".to_string()));
}

#[test]
fn split_respects_quotes() {
    assert_eq!(
        args::split_cmdline(r#"-m "connection refused" -s 'a b' -x \ y"#),
        vec!["-m", "connection refused", "-s", "a b", "-x", " y"]
    );
    assert_eq!(args::split_cmdline("  "), Vec::<String>::new());
    assert_eq!(args::split_cmdline(r#""""#), vec![""]);
}

#[test]
fn render_description_leaves_unknown_placeholders() {
    let specs = vec![make_spec("host", false, "localhost")];
    let rendered = args::render_description("HTTP check of {{host}} ({{extra}})", &specs, &HashMap::new());
    assert_eq!(rendered, "HTTP check of localhost ({{extra}})");
}

// ---- check runner ----

#[tokio::test]
async fn runner_maps_exit_zero_to_up() {
    let result = PluginRunner
        .execute(
            "/bin/sh",
            &["-c".to_string(), "echo 'OK - all good|time=1ms'; exit 0".to_string()],
            Duration::from_secs(5),
        )
        .await;
    assert_eq!(result.state, MonitorState::Up);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.message, "OK - all good");
}

#[tokio::test]
async fn runner_maps_warning_and_critical_to_down() {
    for code in [1, 2] {
        let result = PluginRunner
            .execute(
                "/bin/sh",
                &["-c".to_string(), format!("echo 'service broken'; exit {code}")],
                Duration::from_secs(5),
            )
            .await;
        assert_eq!(result.state, MonitorState::Down, "exit {code}");
        assert_eq!(result.exit_code, Some(code));
        assert_eq!(result.message, "service broken");
    }
}

#[tokio::test]
async fn runner_maps_unexpected_exit_code_to_unknown() {
    let result = PluginRunner
        .execute(
            "/bin/sh",
            &["-c".to_string(), "exit 3".to_string()],
            Duration::from_secs(5),
        )
        .await;
    assert_eq!(result.state, MonitorState::Unknown);
    assert_eq!(result.exit_code, Some(3));
    assert!(result.message.contains("unexpected exit status 3"));
}

#[tokio::test]
async fn runner_times_out_and_reports_unknown() {
    let started = std::time::Instant::now();
    let result = PluginRunner
        .execute(
            "/bin/sh",
            &["-c".to_string(), "sleep 30".to_string()],
            Duration::from_millis(200),
        )
        .await;
    assert_eq!(result.state, MonitorState::Unknown);
    assert_eq!(result.exit_code, None);
    assert!(result.message.contains("timed out"));
    // timeout + small grace, never the child's 30 seconds
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn runner_reports_spawn_failure_as_unknown() {
    let result = PluginRunner
        .execute("/nonexistent/check_plugin", &[], Duration::from_secs(5))
        .await;
    assert_eq!(result.state, MonitorState::Unknown);
    assert_eq!(result.exit_code, None);
    assert!(result.message.contains("could not be started"));
}

#[tokio::test]
async fn runner_truncates_long_output() {
    let result = PluginRunner
        .execute(
            "/bin/sh",
            &["-c".to_string(), "printf 'x%.0s' $(seq 1 500)".to_string()],
            Duration::from_secs(5),
        )
        .await;
    assert_eq!(result.state, MonitorState::Up);
    assert_eq!(result.message.len(), 200);
}

// ---- event broker ----

#[tokio::test]
async fn broker_delivers_events_to_subscribers() {
    let broker = EventBroker::new(16);
    let mut rx = broker.subscribe();

    broker.publish(MonitorEvent::Scheduled {
        monitor_id: "m-1".to_string(),
        interval_secs: 180,
        timestamp: Utc::now(),
    });

    let event = rx.recv().await.unwrap();
    assert_eq!(event.category(), EventCategory::Scheduled);
    assert_eq!(event.monitor_id(), "m-1");
}

#[test]
fn broker_publish_without_subscribers_is_a_noop() {
    let broker = EventBroker::new(16);
    assert_eq!(broker.subscriber_count(), 0);
    broker.publish(MonitorEvent::CheckFinished {
        monitor_id: "m-1".to_string(),
        result: make_result(MonitorState::Up, "ok"),
    });
}

#[test]
fn event_serialization_is_tagged() {
    let event = MonitorEvent::Scheduled {
        monitor_id: "m-1".to_string(),
        interval_secs: 60,
        timestamp: Utc::now(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "scheduled");
    assert_eq!(json["monitor_id"], "m-1");
    assert_eq!(json["interval_secs"], 60);
}

#[test]
fn event_category_round_trips() {
    for cat in [
        EventCategory::Scheduled,
        EventCategory::CheckFinished,
        EventCategory::StateChange,
    ] {
        let parsed: EventCategory = cat.to_string().parse().unwrap();
        assert_eq!(parsed, cat);
    }
    assert!("bogus".parse::<EventCategory>().is_err());
}
