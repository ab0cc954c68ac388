//! Raceway: a race-driven async state machine
//!
//! Each state of a Raceway machine races a set of named watchers, and the
//! machine moves to the state named by whichever watcher settles first. There
//! is no fixed edge table: the graph only says which names are legal
//! targets, and a deadline watcher sends the machine to the `timeout` state.
//!
//! # Core Concepts
//!
//! - **Watcher**: a named asynchronous operation that may win a race
//! - **Entry action**: runs when a state is entered and arms its watchers
//! - **Terminal state**: entering it ends the run without a race
//! - **Cooperative stop**: ends the run between states, never mid-race
//!
//! # Example
//!
//! ```rust
//! use raceway::builder::{deadline_state, terminal, StateGraphBuilder, StateMachineBuilder};
//! use raceway::race::{Watcher, WatcherSet};
//! use std::time::Duration;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # rt.block_on(async {
//! let graph = StateGraphBuilder::<&'static str, ()>::new()
//!     .state(
//!         "submit",
//!         deadline_state(Duration::from_secs(10), || {
//!             WatcherSet::new().with("success", Watcher::resolves(async { "accepted" }))
//!         }),
//!     )
//!     .state("success", terminal())
//!     .state("timeout", terminal())
//!     .build()
//!     .unwrap();
//!
//! let mut machine = StateMachineBuilder::new().states(graph).build().unwrap();
//! let outcome = machine.start("submit", &()).await.unwrap();
//!
//! assert_eq!(outcome.state(), "success");
//! assert_eq!(machine.history().get_path(), vec!["submit", "success"]);
//! # });
//! ```

pub mod builder;
pub mod core;
pub mod effects;
pub mod race;

// Re-export commonly used types
pub use crate::core::{Entry, MachineConfig, StateDescriptor, StateGraph, StateHistory};
pub use effects::{MachineError, MachineStatus, RunOutcome, StateMachine, StopHandle};
pub use race::{race, RaceResult, Settlement, Watcher, WatcherSet, Winner};
