#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tower::util::ServiceExt;
use upmon_common::types::{
    AlertEvent, ArgSpec, CheckResult, Contact, MonitorConfig, MonitorDef, MonitorState,
};
use upmon_monitor::event::{EventBroker, EventCategory, MonitorEvent};
use upmon_monitor::runner::CheckExecutor;
use upmon_notify::manager::NotificationManager;
use upmon_notify::NotificationChannel;
use upmon_server::app;
use upmon_server::config::ServerConfig;
use upmon_server::scheduler::MonitorScheduler;
use upmon_server::state::AppState;
use upmon_storage::MonitorStore;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

pub fn build_test_context() -> Result<TestContext> {
    build_test_context_with(
        Arc::new(StaticExecutor::new(MonitorState::Up)),
        ServerConfig::default(),
        vec![],
    )
}

pub fn build_test_context_with(
    executor: Arc<dyn CheckExecutor>,
    mut config: ServerConfig,
    channels: Vec<Box<dyn NotificationChannel>>,
) -> Result<TestContext> {
    upmon_common::id::init(1, 1);

    let temp_dir = tempfile::tempdir()?;
    config.db_path = temp_dir
        .path()
        .join("upmon.db")
        .to_string_lossy()
        .to_string();

    let store = Arc::new(MonitorStore::new(Path::new(&config.db_path))?);
    let notifier = Arc::new(NotificationManager::new(channels));
    let broker = EventBroker::new(64);

    let scheduler = Arc::new(MonitorScheduler::new(
        store.clone(),
        executor,
        notifier.clone(),
        broker.clone(),
        config.scheduler.max_concurrent_checks,
        Duration::from_secs(config.scheduler.tick_secs.max(1)),
        Duration::from_secs(config.scheduler.check_timeout_secs.max(1)),
    ));
    scheduler.load()?;

    let state = AppState {
        scheduler,
        store,
        notifier,
        broker,
        start_time: Utc::now(),
        config: Arc::new(config),
    };
    let app = app::build_http_app(state.clone());

    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

// ---- stub check executors ----

/// Always returns the same state.
pub struct StaticExecutor {
    state: MonitorState,
}

impl StaticExecutor {
    pub fn new(state: MonitorState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CheckExecutor for StaticExecutor {
    async fn execute(&self, _command: &str, _args: &[String], _timeout: Duration) -> CheckResult {
        make_result(self.state)
    }
}

/// Returns a scripted sequence of states, then keeps repeating the last.
pub struct SequenceExecutor {
    states: std::sync::Mutex<Vec<MonitorState>>,
}

impl SequenceExecutor {
    pub fn new(states: Vec<MonitorState>) -> Self {
        let mut states = states;
        states.reverse();
        Self {
            states: std::sync::Mutex::new(states),
        }
    }
}

#[async_trait]
impl CheckExecutor for SequenceExecutor {
    async fn execute(&self, _command: &str, _args: &[String], _timeout: Duration) -> CheckResult {
        let state = {
            let mut states = self.states.lock().unwrap();
            if states.len() > 1 {
                states.pop().unwrap()
            } else {
                *states.last().unwrap_or(&MonitorState::Up)
            }
        };
        make_result(state)
    }
}

/// Blocks every check until released; tracks how many checks started and
/// the maximum number in flight at once.
pub struct BlockingExecutor {
    pub started: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    release: tokio::sync::Semaphore,
}

impl BlockingExecutor {
    pub fn new() -> Self {
        Self {
            started: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            release: tokio::sync::Semaphore::new(0),
        }
    }

    /// Allow `n` blocked checks to finish.
    pub fn release(&self, n: usize) {
        self.release.add_permits(n);
    }
}

#[async_trait]
impl CheckExecutor for BlockingExecutor {
    async fn execute(&self, _command: &str, _args: &[String], _timeout: Duration) -> CheckResult {
        self.started.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        match self.release.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => {}
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        make_result(MonitorState::Up)
    }
}

fn make_result(state: MonitorState) -> CheckResult {
    CheckResult {
        state,
        message: format!("stub check: {state}"),
        duration_ms: 1,
        exit_code: Some(match state {
            MonitorState::Up => 0,
            MonitorState::Down => 2,
            MonitorState::Unknown => 3,
        }),
        timestamp: Utc::now(),
    }
}

// ---- notification stubs ----

pub struct CountingChannel {
    pub sends: Arc<AtomicUsize>,
}

#[async_trait]
impl NotificationChannel for CountingChannel {
    async fn send(&self, _alert: &AlertEvent, _contacts: &[Contact]) -> Result<()> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "counting"
    }
}

// ---- fixtures ----

pub fn http_def() -> MonitorDef {
    let now = Utc::now();
    MonitorDef {
        id: upmon_common::id::next_id(),
        name: "http".to_string(),
        active: true,
        cmdline_filename: "/usr/lib/nagios/plugins/check_http".to_string(),
        cmdline_args_tmpl: "-H {{host}} -p {{port}}".to_string(),
        description_tmpl: "HTTP check of {{host}}".to_string(),
        arg_specs: vec![
            ArgSpec {
                id: upmon_common::id::next_id(),
                name: "host".to_string(),
                display_name: "Host".to_string(),
                description: "Host to check".to_string(),
                required: true,
                default_value: String::new(),
            },
            ArgSpec {
                id: upmon_common::id::next_id(),
                name: "port".to_string(),
                display_name: "Port".to_string(),
                description: String::new(),
                required: false,
                default_value: "80".to_string(),
            },
        ],
        created_at: now,
        updated_at: now,
    }
}

pub fn monitor_config(def_id: &str, threshold: u32) -> MonitorConfig {
    let now = Utc::now();
    let mut args = HashMap::new();
    args.insert("host".to_string(), "web-01.example.com".to_string());
    MonitorConfig {
        id: upmon_common::id::next_id(),
        def_id: def_id.to_string(),
        interval_secs: 1,
        threshold,
        checks_enabled: true,
        alerts_enabled: true,
        args,
        metadata: HashMap::new(),
        created_at: now,
        updated_at: now,
    }
}

// ---- event helpers ----

/// Wait until an event of the given category arrives, skipping others.
pub async fn wait_for_category(
    rx: &mut broadcast::Receiver<MonitorEvent>,
    category: EventCategory,
) -> MonitorEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event broker closed");
            if event.category() == category {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Drain everything currently buffered on the receiver.
pub fn drain_events(rx: &mut broadcast::Receiver<MonitorEvent>) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Poll an assertion until it holds or the timeout expires.
pub async fn wait_until<F: Fn() -> bool>(what: &str, predicate: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        if predicate() {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting until {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ---- HTTP helpers ----

pub async fn request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    request_with_headers(app, method, path, body, &[]).await
}

pub async fn request_with_headers(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, &str)],
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body)?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, json))
}
