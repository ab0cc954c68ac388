//! Build errors for state graphs and machines.

use thiserror::Error;

/// Errors that can occur when building state graphs.
///
/// Only the shape of the graph is checked. Whether the names watchers report
/// exist is decided at transition time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("State '{0}' is defined more than once")]
    DuplicateState(String),

    #[error("No states defined. Add at least one state")]
    NoStates,
}
