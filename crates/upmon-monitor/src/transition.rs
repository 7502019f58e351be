//! The per-monitor state machine.
//!
//! [`apply`] is a pure function of the current [`StateRecord`] and one new
//! [`CheckResult`]; it never touches storage or the scheduler, which keeps
//! the confirmation logic independently testable.

use chrono::{DateTime, Utc};
use upmon_common::types::{CheckResult, MonitorState, StateRecord};

/// A confirmed change of the announced state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub previous: MonitorState,
    pub previous_duration_secs: i64,
}

/// Feed one check result into a monitor's state record.
///
/// A result agreeing with the candidate state increments the consecutive
/// count; a disagreeing result replaces the candidate and resets the count
/// to 1 (no partial credit). Once the count reaches `threshold` and the
/// candidate differs from the announced state, the announced state flips,
/// the count re-anchors at 1, and the transition is returned for alerting.
/// A threshold of 1 flips on every disagreeing check.
///
/// UNKNOWN is an ordinary third state: a monitor that cannot be checked is
/// eventually announced as unknown rather than holding its last known-good
/// state forever.
pub fn apply(
    record: &StateRecord,
    result: &CheckResult,
    threshold: u32,
    now: DateTime<Utc>,
) -> (StateRecord, Option<StateTransition>) {
    let mut next = record.clone();

    if result.state == next.candidate {
        next.consecutive = next.consecutive.saturating_add(1);
    } else {
        next.candidate = result.state;
        next.consecutive = 1;
    }
    next.last_message = result.message.clone();

    if next.consecutive >= threshold.max(1) && next.candidate != next.announced {
        let transition = StateTransition {
            previous: next.announced,
            previous_duration_secs: (now - next.state_since).num_seconds(),
        };
        next.announced = next.candidate;
        next.state_since = now;
        next.consecutive = 1;
        return (next, Some(transition));
    }

    (next, None)
}
