//! The control loop around the pure core.
//!
//! This module is the imperative shell: it runs entry actions, races the
//! watchers they arm and commits each winner as the next state.
//!
//! # Key Concepts
//!
//! - **State Machine**: owns the graph, the current state and the stop flag
//! - **Entry actions**: awaited to completion before their watchers race
//! - **Cooperative stop**: observed between states, never mid-race
//!
//! # Error kinds
//!
//! A name that is not in the graph is a programming error
//! ([`MachineError::InvalidTransition`]); a failing entry action or watcher is
//! a runtime failure ([`MachineError::EntryFailed`],
//! [`MachineError::WatcherFailed`]). Both end the run. A deadline winning is
//! not an error: it is a move to the timeout state.

mod error;
mod machine;
mod stop;

pub use error::MachineError;
pub use machine::{MachineStatus, RunOutcome, StateMachine};
pub use stop::StopHandle;
