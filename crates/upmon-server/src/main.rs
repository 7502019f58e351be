use anyhow::Result;
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use upmon_monitor::event::EventBroker;
use upmon_monitor::runner::PluginRunner;
use upmon_notify::channels::email::EmailChannel;
use upmon_notify::channels::slack::SlackChannel;
use upmon_notify::channels::webhook::WebhookChannel;
use upmon_notify::manager::NotificationManager;
use upmon_notify::NotificationChannel;
use upmon_server::app;
use upmon_server::config::{self, ServerConfig};
use upmon_server::scheduler::MonitorScheduler;
use upmon_server::state::AppState;
use upmon_storage::MonitorStore;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  upmon-server [config.toml]    Start the server");
}

#[tokio::main]
async fn main() -> Result<()> {
    upmon_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("upmon=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        arg => {
            let config_path = arg.unwrap_or("config/server.toml");
            run_server(config_path).await
        }
    }
}

fn build_channels(config: &config::NotifyConfig) -> Result<Vec<Box<dyn NotificationChannel>>> {
    let mut channels: Vec<Box<dyn NotificationChannel>> = Vec::new();
    if let Some(email) = &config.email {
        channels.push(Box::new(EmailChannel::new(
            &email.smtp_host,
            email.smtp_port,
            email.username.as_deref(),
            email.password.as_deref(),
            &email.from,
        )?));
    }
    if let Some(webhook) = &config.webhook {
        channels.push(Box::new(WebhookChannel::new(
            webhook.urls.clone(),
            webhook.body_template.clone(),
        )));
    }
    if let Some(slack) = &config.slack {
        channels.push(Box::new(SlackChannel::new(&slack.webhook_url)));
    }
    if channels.is_empty() {
        tracing::warn!("No notification channels configured, alerts will not be delivered");
    }
    Ok(channels)
}

async fn run_server(config_path: &str) -> Result<()> {
    let config = ServerConfig::load(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        db_path = %config.db_path,
        max_concurrent = config.scheduler.max_concurrent_checks,
        "upmon-server starting"
    );

    // Build components
    let store = Arc::new(MonitorStore::new(Path::new(&config.db_path))?);
    let notifier = Arc::new(NotificationManager::new(build_channels(&config.notify)?));
    let broker = EventBroker::new(config.event_buffer);

    let scheduler = Arc::new(MonitorScheduler::new(
        store.clone(),
        Arc::new(PluginRunner),
        notifier.clone(),
        broker.clone(),
        config.scheduler.max_concurrent_checks,
        Duration::from_secs(config.scheduler.tick_secs.max(1)),
        Duration::from_secs(config.scheduler.check_timeout_secs.max(1)),
    ));
    scheduler.load()?;

    let state = AppState {
        scheduler: scheduler.clone(),
        store,
        notifier,
        broker,
        start_time: Utc::now(),
        config: Arc::new(config.clone()),
    };

    let scheduler_handle = tokio::spawn(scheduler.run());

    // HTTP/REST server
    let http_addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = app::build_http_app(state);
    let http_listener = tokio::net::TcpListener::bind(http_addr).await?;
    tracing::info!(http = %http_addr, "Server started");

    let http_server = axum::serve(http_listener, app)
        .with_graceful_shutdown(async {
            signal::ctrl_c().await.ok();
        });

    tokio::select! {
        result = http_server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server error");
            }
        }
        _ = signal::ctrl_c() => {
            tracing::info!("Shutting down gracefully");
        }
    }

    // In-flight checks are killed with the process; child plugins are
    // spawned with kill_on_drop, so none outlive the scheduler task.
    scheduler_handle.abort();
    tracing::info!("Server stopped");

    Ok(())
}
