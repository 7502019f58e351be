//! Check plugin execution.
//!
//! Plugins follow the service-check convention: exit 0 is up, exit 1
//! (warning) and 2 (critical) both count as down for the binary state
//! machine. Anything else (timeouts, signal deaths, spawn failures)
//! maps to unknown. Output of the form `text|perfdata` is split and only
//! the text part is kept.

use async_trait::async_trait;
use chrono::Utc;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use upmon_common::types::{CheckResult, MonitorState};

/// Maximum stored length for check output messages.
const MAX_MESSAGE_LEN: usize = 200;

/// Executes one fully-expanded check command line.
///
/// The scheduler only depends on this trait, so tests can substitute a
/// deterministic executor instead of spawning real processes.
#[async_trait]
pub trait CheckExecutor: Send + Sync {
    async fn execute(&self, command: &str, args: &[String], timeout: Duration) -> CheckResult;
}

/// Production executor: spawns the plugin as a child process.
///
/// The child is spawned with `kill_on_drop`, so a check that outlives its
/// timeout is killed when the wait future is dropped; a stuck plugin can
/// never hold a concurrency permit past timeout + grace.
pub struct PluginRunner;

#[async_trait]
impl CheckExecutor for PluginRunner {
    async fn execute(&self, command: &str, args: &[String], timeout: Duration) -> CheckResult {
        let started = Instant::now();

        let child = match Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return unknown_result(
                    format!("check command could not be started: {e}"),
                    started,
                );
            }
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let text = parse_plugin_output(&output.stdout, &output.stderr);
                let (state, message) = match output.status.code() {
                    Some(0) | Some(1) | Some(2) => {
                        let state = if output.status.code() == Some(0) {
                            MonitorState::Up
                        } else {
                            MonitorState::Down
                        };
                        (state, text)
                    }
                    Some(code) => {
                        let message = if text.is_empty() {
                            format!("check exited with unexpected status {code}")
                        } else {
                            text
                        };
                        (MonitorState::Unknown, message)
                    }
                    None => (
                        MonitorState::Unknown,
                        "check terminated by signal".to_string(),
                    ),
                };
                CheckResult {
                    state,
                    message,
                    duration_ms: started.elapsed().as_millis() as u64,
                    exit_code: output.status.code(),
                    timestamp: Utc::now(),
                }
            }
            Ok(Err(e)) => unknown_result(format!("failed to read check output: {e}"), started),
            Err(_) => unknown_result(format!("check timed out after {timeout:?}"), started),
        }
    }
}

fn unknown_result(message: String, started: Instant) -> CheckResult {
    CheckResult {
        state: MonitorState::Unknown,
        message,
        duration_ms: started.elapsed().as_millis() as u64,
        exit_code: None,
        timestamp: Utc::now(),
    }
}

/// Combine stdout and stderr, strip the `|perfdata` suffix, and truncate
/// to a reasonable stored length.
fn parse_plugin_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut raw = stdout.to_vec();
    raw.extend_from_slice(stderr);
    let combined = String::from_utf8_lossy(&raw);
    let text = combined.split('|').next().unwrap_or("").trim();
    truncate_message(text)
}

/// Truncate to at most [`MAX_MESSAGE_LEN`] bytes, snapping to a char
/// boundary so a multi-byte character is never split.
fn truncate_message(text: &str) -> String {
    if text.len() <= MAX_MESSAGE_LEN {
        return text.to_string();
    }
    let mut end = MAX_MESSAGE_LEN;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
