//! Race scheduler: start named watchers together, commit to the first.
//!
//! # Key Concepts
//!
//! - **Watcher**: a named asynchronous operation, either already started or
//!   a factory that starts it when the race begins
//! - **WatcherSet**: the watchers armed for one race, in insertion order
//! - **Settlement**: a watcher either settles with a value (and wins under its
//!   own name) or with the deadline marker (and the timeout sentinel wins)
//!
//! Losing watchers are not cancelled. By default they are detached onto the
//! runtime and whatever they settle with later is discarded.
//!
//! # Example
//!
//! ```rust
//! use raceway::race::{race, timers, Watcher, WatcherSet};
//! use std::time::Duration;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
//! # rt.block_on(async {
//! let watchers = WatcherSet::new()
//!     .with("success", Watcher::resolves(async { "confirmed" }))
//!     .with("timeout", timers::timeout(Duration::from_secs(5)));
//!
//! let result = race(watchers).await.unwrap();
//! assert_eq!(result.winner_name(), Some("success"));
//! # });
//! # }
//! ```

mod scheduler;
pub mod timers;
mod watcher;

pub use scheduler::{race, race_with, LoserPolicy, RaceError, RaceResult, Winner};
pub use watcher::{
    CollaboratorError, Settlement, Watcher, WatcherFactory, WatcherFuture, WatcherSet,
};
