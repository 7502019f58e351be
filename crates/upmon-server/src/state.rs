use crate::config::ServerConfig;
use crate::scheduler::MonitorScheduler;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use upmon_monitor::event::EventBroker;
use upmon_notify::manager::NotificationManager;
use upmon_storage::MonitorStore;

#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<MonitorScheduler>,
    pub store: Arc<MonitorStore>,
    pub notifier: Arc<NotificationManager>,
    pub broker: EventBroker,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
