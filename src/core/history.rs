//! Transition history tracking.
//!
//! Every state the control loop enters is recorded together with what caused
//! the move: the initial `start`, a named watcher winning, or the deadline.
//! History is immutable; `record` returns a new history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What moved the machine into a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// The initial state passed to `start`.
    Start,

    /// The named watcher won the previous state's race.
    Watcher(String),

    /// The previous state's deadline won.
    Timeout,
}

/// Record of a single state entry.
///
/// # Example
///
/// ```rust
/// use raceway::core::{StateTransition, Trigger};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: Some("open".to_string()),
///     to: "success".to_string(),
///     trigger: Trigger::Watcher("success".to_string()),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, "success");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left, `None` for the initial entry
    pub from: Option<String>,
    /// The state being entered
    pub to: String,
    /// What caused the move
    pub trigger: Trigger,
    /// When the state was entered
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of state entries.
///
/// # Example
///
/// ```rust
/// use raceway::core::{StateHistory, StateTransition, Trigger};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: None,
///         to: "submit".to_string(),
///         trigger: Trigger::Start,
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: Some("submit".to_string()),
///         to: "timeout".to_string(),
///         trigger: Trigger::Timeout,
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path(), vec!["submit", "timeout"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<StateTransition>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Names of the states entered, in order.
    ///
    /// When the first record has a `from` state (history that did not begin
    /// at `start`), that state leads the path.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(from) = self.transitions.first().and_then(|t| t.from.as_deref()) {
            path.push(from);
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and last recorded entries.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// How many times the deadline decided a race.
    pub fn timeouts(&self) -> usize {
        self.transitions
            .iter()
            .filter(|t| t.trigger == Trigger::Timeout)
            .count()
    }

    pub fn last(&self) -> Option<&StateTransition> {
        self.transitions.last()
    }

    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }
}
