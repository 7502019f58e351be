//! Live event stream over websocket.
//!
//! Clients receive the scheduler's event stream as JSON messages and can
//! narrow it with subscribe commands or pause/resume delivery without
//! disconnecting:
//!
//! ```json
//! {"action": "subscribe", "events": ["state_change"], "monitors": ["123"]}
//! {"action": "pause"}
//! {"action": "resume"}
//! ```
//!
//! An empty filter list means "all". A client that falls behind the event
//! buffer loses the oldest events (never blocking the scheduler) and is
//! told how many were dropped.

use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::broadcast;
use upmon_monitor::event::{EventCategory, MonitorEvent};

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientCommand {
    Subscribe {
        #[serde(default)]
        events: Vec<EventCategory>,
        #[serde(default)]
        monitors: Vec<String>,
    },
    Pause,
    Resume,
}

struct SubscriberFilter {
    events: Option<HashSet<EventCategory>>,
    monitors: Option<HashSet<String>>,
    active: bool,
}

impl SubscriberFilter {
    fn new() -> Self {
        Self {
            events: None,
            monitors: None,
            active: true,
        }
    }

    fn wants(&self, event: &MonitorEvent) -> bool {
        if !self.active {
            return false;
        }
        if let Some(events) = &self.events {
            if !events.contains(&event.category()) {
                return false;
            }
        }
        if let Some(monitors) = &self.monitors {
            if !monitors.contains(event.monitor_id()) {
                return false;
            }
        }
        true
    }

    fn apply(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::Subscribe { events, monitors } => {
                self.events = if events.is_empty() {
                    None
                } else {
                    Some(events.into_iter().collect())
                };
                self.monitors = if monitors.is_empty() {
                    None
                } else {
                    Some(monitors.into_iter().collect())
                };
                self.active = true;
            }
            ClientCommand::Pause => self.active = false,
            ClientCommand::Resume => self.active = true,
        }
    }
}

pub async fn events_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let rx = state.broker.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<MonitorEvent>) {
    let (mut sender, mut receiver) = socket.split();
    let mut filter = SubscriberFilter::new();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if !filter.wants(&event) {
                        continue;
                    }
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event subscriber lagged, oldest events dropped");
                    let notice = format!("{{\"event\":\"lagged\",\"dropped\":{skipped}}}");
                    if sender.send(Message::Text(notice.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientCommand>(&text) {
                        Ok(command) => filter.apply(command),
                        Err(e) => {
                            tracing::debug!(error = %e, "Ignoring malformed subscriber command");
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }
}
