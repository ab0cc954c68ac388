//! Errors that end a run.

use crate::race::CollaboratorError;
use thiserror::Error;

/// Errors surfaced by [`StateMachine::start`](crate::effects::StateMachine::start).
///
/// `InvalidTransition` and `NoWatchers` point at a mistake in the supplied
/// graph or in a watcher's name. `EntryFailed` and `WatcherFailed` carry a
/// collaborator's own failure. None of them is retried.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("No state '{name}' in states [{}]", .valid.join(", "))]
    InvalidTransition { name: String, valid: Vec<String> },

    #[error("Entry action of state '{state}' failed: {source}")]
    EntryFailed {
        state: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("Watcher '{watcher}' failed in state '{state}': {source}")]
    WatcherFailed {
        state: String,
        watcher: String,
        #[source]
        source: CollaboratorError,
    },

    #[error("State '{state}' armed no watchers and no standing watchers remain")]
    NoWatchers { state: String },

    #[error("Machine has already run; build a new machine for another run")]
    AlreadyStarted,
}

impl MachineError {
    /// The graph or a watcher named a state that does not exist.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, MachineError::InvalidTransition { .. })
    }

    /// An entry action or a watcher failed.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            MachineError::EntryFailed { .. } | MachineError::WatcherFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_lists_valid_names() {
        let err = MachineError::InvalidTransition {
            name: "doesNotExist".to_string(),
            valid: vec!["a".to_string(), "b".to_string()],
        };

        assert_eq!(err.to_string(), "No state 'doesNotExist' in states [a, b]");
        assert!(err.is_invalid_transition());
        assert!(!err.is_collaborator_failure());
    }

    #[test]
    fn collaborator_failures_keep_their_source() {
        let err = MachineError::WatcherFailed {
            state: "open".to_string(),
            watcher: "error".to_string(),
            source: "bet rejected".into(),
        };

        assert!(err.is_collaborator_failure());
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("bet rejected".to_string())
        );
    }
}
