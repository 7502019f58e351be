use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Static API key required in the `X-Api-Key` header. When unset the
    /// API is open (development mode).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Capacity of the live-event broadcast buffer. Subscribers that fall
    /// further behind than this lose the oldest events.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            db_path: default_db_path(),
            api_key: None,
            event_buffer: default_event_buffer(),
            scheduler: SchedulerConfig::default(),
            notify: NotifyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Scheduling pass interval.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
    /// Global cap on simultaneously running checks.
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
    /// Hard timeout for one check invocation.
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,
    /// Check interval for monitors that do not specify one.
    #[serde(default = "default_interval_secs")]
    pub default_interval_secs: u64,
    /// Consecutive-check threshold for monitors that do not specify one.
    #[serde(default = "default_threshold")]
    pub default_threshold: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            max_concurrent_checks: default_max_concurrent_checks(),
            check_timeout_secs: default_check_timeout_secs(),
            default_interval_secs: default_interval_secs(),
            default_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
    #[serde(default)]
    pub slack: Option<SlackConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub body_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub webhook_url: String,
}

fn default_http_port() -> u16 {
    8080
}

fn default_db_path() -> String {
    "data/upmon.db".to_string()
}

fn default_event_buffer() -> usize {
    256
}

fn default_tick_secs() -> u64 {
    1
}

fn default_max_concurrent_checks() -> usize {
    200
}

fn default_check_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    180
}

fn default_threshold() -> u32 {
    3
}

fn default_smtp_port() -> u16 {
    25
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}
