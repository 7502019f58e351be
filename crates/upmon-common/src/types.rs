use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confirmed or tentative state of a monitored service.
///
/// # Examples
///
/// ```
/// use upmon_common::types::MonitorState;
///
/// let state: MonitorState = "down".parse().unwrap();
/// assert_eq!(state, MonitorState::Down);
/// assert_eq!(state.to_string(), "down");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Up,
    Down,
    Unknown,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorState::Up => write!(f, "up"),
            MonitorState::Down => write!(f, "down"),
            MonitorState::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for MonitorState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(MonitorState::Up),
            "down" => Ok(MonitorState::Down),
            "unknown" => Ok(MonitorState::Unknown),
            _ => Err(format!("unknown monitor state: {s}")),
        }
    }
}

impl Default for MonitorState {
    fn default() -> Self {
        MonitorState::Unknown
    }
}

/// Immutable output of one check plugin invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub state: MonitorState,
    pub message: String,
    pub duration_ms: u64,
    /// None when the check timed out or could not be spawned.
    pub exit_code: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

/// Per-monitor status: the externally announced state plus the candidate
/// state implied by recent, not yet confirmed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRecord {
    pub announced: MonitorState,
    pub candidate: MonitorState,
    /// Number of consecutive checks agreeing with `candidate`.
    pub consecutive: u32,
    /// When `announced` last changed.
    pub state_since: DateTime<Utc>,
    pub last_message: String,
}

impl StateRecord {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            announced: MonitorState::Unknown,
            candidate: MonitorState::Unknown,
            consecutive: 1,
            state_since: now,
            last_message: String::new(),
        }
    }
}

/// Emitted once per confirmed state transition.
///
/// Carries everything a downstream template renderer needs; the engine
/// itself never formats human-readable alert text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: String,
    pub monitor_id: String,
    /// Rendered from the definition's description template.
    pub monitor_description: String,
    pub previous_state: MonitorState,
    pub new_state: MonitorState,
    /// How long the previous announced state lasted.
    pub previous_state_duration_secs: i64,
    /// Message from the check that confirmed the transition.
    pub message: String,
    /// Monitor metadata snapshot at transition time.
    pub metadata: HashMap<String, String>,
    /// Merged argument map (definition defaults + monitor overrides),
    /// supplied as rendering input for downstream templating.
    pub arguments: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

/// One argument accepted by a monitor definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgSpec {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub required: bool,
    pub default_value: String,
}

/// Template for a class of checks: a plugin path plus argument and
/// description templates parameterized by named arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorDef {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub cmdline_filename: String,
    /// Argument template using `{{name}}` placeholders.
    pub cmdline_args_tmpl: String,
    pub description_tmpl: String,
    pub arg_specs: Vec<ArgSpec>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled target: a monitor definition bound to concrete arguments
/// and scheduling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub id: String,
    pub def_id: String,
    pub interval_secs: u64,
    /// Consecutive same-direction results required to confirm a transition.
    pub threshold: u32,
    pub checks_enabled: bool,
    pub alerts_enabled: bool,
    /// Overrides for the definition's argument defaults.
    pub args: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A notification recipient that can be attached to monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Format a string map into a stable human-readable string.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use upmon_common::types::format_map;
///
/// let mut meta = HashMap::new();
/// meta.insert("owner".to_string(), "noc".to_string());
/// meta.insert("site".to_string(), "fra1".to_string());
/// assert_eq!(format_map(&meta), "owner=noc, site=fra1");
/// ```
pub fn format_map(map: &HashMap<String, String>) -> String {
    if map.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    pairs.join(", ")
}

// ---- API request types ----

/// Create monitor definition request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMonitorDefRequest {
    pub name: String,
    pub cmdline_filename: String,
    pub cmdline_args_tmpl: String,
    pub description_tmpl: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub args: Vec<DefArgRequest>,
}

/// Create or replace a definition argument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefArgRequest {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default_value: String,
}

/// Update monitor definition request (all fields optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMonitorDefRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub cmdline_filename: Option<String>,
    #[serde(default)]
    pub cmdline_args_tmpl: Option<String>,
    #[serde(default)]
    pub description_tmpl: Option<String>,
}

/// Create monitor request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMonitorRequest {
    pub def_id: String,
    #[serde(default)]
    pub args: HashMap<String, String>,
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub threshold: Option<u32>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Replace a monitor's argument overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMonitorArgsRequest {
    pub args: HashMap<String, String>,
}

/// Enable or disable checks/alerts for a monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Update a monitor's check interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIntervalRequest {
    pub interval_secs: u64,
}

/// Update a monitor's consecutive-check threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateThresholdRequest {
    pub threshold: u32,
}

/// Create contact request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}
