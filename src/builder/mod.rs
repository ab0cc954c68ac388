//! Builder API for ergonomic state graph and machine construction.
//!
//! This module provides fluent builders and a macro for assembling graphs,
//! machines and watcher sets with minimal boilerplate.

pub mod error;
pub mod graph;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use graph::{StateBuilder, StateGraphBuilder};
pub use machine::StateMachineBuilder;

use crate::race::{timers, Settlement, Watcher, WatcherSet};
use std::time::Duration;

/// A terminal state with no entry action.
///
/// # Example
///
/// ```
/// use raceway::builder::{terminal, StateGraphBuilder};
///
/// let graph = StateGraphBuilder::<u32, ()>::new()
///     .state("success", terminal())
///     .build()
///     .unwrap();
/// assert!(graph.get("success").unwrap().is_terminal());
/// ```
pub fn terminal<T, Env>() -> StateBuilder<T, Env> {
    StateBuilder::new().terminal()
}

/// A state that races `watchers` against a deadline of `budget`.
///
/// The deadline is registered last, so a real watcher that is ready in the
/// same poll wins over it.
///
/// # Example
///
/// ```
/// use raceway::builder::{deadline_state, terminal, StateGraphBuilder};
/// use raceway::race::{Watcher, WatcherSet};
/// use std::time::Duration;
///
/// let graph = StateGraphBuilder::<u32, ()>::new()
///     .state(
///         "open",
///         deadline_state(Duration::from_secs(5), || {
///             WatcherSet::new().with("success", Watcher::resolves(async { 1 }))
///         }),
///     )
///     .state("success", terminal())
///     .state("timeout", terminal())
///     .build()
///     .unwrap();
/// assert_eq!(graph.len(), 3);
/// ```
pub fn deadline_state<T, Env, F>(budget: Duration, watchers: F) -> StateBuilder<T, Env>
where
    T: Send + 'static,
    Env: 'static,
    F: Fn() -> WatcherSet<T> + Send + Sync + 'static,
{
    StateBuilder::new().arms(move || {
        let mut set = watchers();
        set.insert(crate::core::DEFAULT_TIMEOUT_STATE, timers::timeout(budget));
        set
    })
}

/// Watcher that is ready on its first poll with `value`.
///
/// Ties with other ready watchers still go to the earliest inserted.
pub fn immediately<T>(value: T) -> Watcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    Watcher::factory(move || {
        let value = value.clone();
        async move { Ok(Settlement::Value(value)) }
    })
}
