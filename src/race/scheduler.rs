//! First-to-settle race over a [`WatcherSet`].

use crate::race::watcher::{CollaboratorError, Settlement, WatcherFuture, WatcherSet};
use futures::future::select_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Who won a race.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// A watcher settled with a value under this name.
    Named(String),

    /// A deadline watcher settled first.
    TimedOut,
}

/// The single committed outcome of a race.
#[derive(Clone, Debug, PartialEq)]
pub struct RaceResult<T> {
    pub winner: Winner,
    pub value: Option<T>,
}

impl<T> RaceResult<T> {
    /// Name of the winning watcher, `None` when the deadline won.
    pub fn winner_name(&self) -> Option<&str> {
        match &self.winner {
            Winner::Named(name) => Some(name),
            Winner::TimedOut => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self.winner, Winner::TimedOut)
    }
}

/// Errors surfaced by [`race`].
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("Cannot race an empty watcher set")]
    Empty,

    #[error("Watcher '{name}' failed before a winner was committed: {source}")]
    WatcherFailed {
        name: String,
        #[source]
        source: CollaboratorError,
    },
}

/// What happens to the watchers that lost a race.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoserPolicy {
    /// Hand losers to the tokio runtime; they run to completion and their
    /// settlements are discarded. Falls back to `Drop` outside a runtime.
    ///
    /// A loser that never settles, such as [`timers::pending`] or an
    /// unbounded [`timers::poll`], stays spawned until the runtime shuts
    /// down. Prefer `Drop` for races that arm such watchers repeatedly.
    ///
    /// [`timers::pending`]: crate::race::timers::pending
    /// [`timers::poll`]: crate::race::timers::poll
    #[default]
    Detach,

    /// Drop losers at commit time.
    Drop,
}

/// Race every watcher in the set and commit to the first to settle.
///
/// Losers are detached, see [`LoserPolicy::Detach`].
pub async fn race<T: Send + 'static>(watchers: WatcherSet<T>) -> Result<RaceResult<T>, RaceError> {
    race_with(watchers, LoserPolicy::Detach).await
}

/// [`race`] with an explicit policy for the losing watchers.
///
/// Watchers are polled in insertion order, so when several are ready in the
/// same poll the earliest registered one wins. Exactly one settlement is
/// committed; whatever the others do afterwards is never observed.
pub async fn race_with<T: Send + 'static>(
    watchers: WatcherSet<T>,
    losers: LoserPolicy,
) -> Result<RaceResult<T>, RaceError> {
    if watchers.is_empty() {
        return Err(RaceError::Empty);
    }

    let (names, futures): (Vec<String>, Vec<WatcherFuture<T>>) = watchers
        .into_entries()
        .into_iter()
        .map(|(name, watcher)| (name, watcher.launch()))
        .unzip();

    let (settled, index, remaining) = select_all(futures).await;
    let name = names[index].clone();

    dispose(remaining, losers);

    match settled {
        Ok(Settlement::Value(value)) => {
            trace!(winner = %name, "race committed");
            Ok(RaceResult {
                winner: Winner::Named(name),
                value: Some(value),
            })
        }
        Ok(Settlement::TimedOut) => {
            trace!(watcher = %name, "race committed to deadline");
            Ok(RaceResult {
                winner: Winner::TimedOut,
                value: None,
            })
        }
        Err(source) => Err(RaceError::WatcherFailed { name, source }),
    }
}

fn dispose<T: Send + 'static>(remaining: Vec<WatcherFuture<T>>, policy: LoserPolicy) {
    if remaining.is_empty() || policy == LoserPolicy::Drop {
        return;
    }

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            for loser in remaining {
                handle.spawn(async move {
                    let _ = loser.await;
                });
            }
        }
        Err(_) => trace!(count = remaining.len(), "no runtime, dropping losing watchers"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::timers::{after, pending, poll, timeout};
    use crate::race::watcher::Watcher;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn earliest_watcher_wins() {
        let set = WatcherSet::new()
            .with("a", after(Duration::from_millis(10), 1))
            .with("b", after(Duration::from_millis(50), 2));

        let result = race(set).await.unwrap();

        assert_eq!(result.winner, Winner::Named("a".to_string()));
        assert_eq!(result.value, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_value_still_wins() {
        let set: WatcherSet<Option<u32>> = WatcherSet::new()
            .with("empty", Watcher::resolves(async { None }))
            .with("late", after(Duration::from_millis(5), Some(7)));

        let result = race(set).await.unwrap();

        assert_eq!(result.winner_name(), Some("empty"));
        assert_eq!(result.value, Some(None));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_wins_as_sentinel() {
        let set: WatcherSet<u32> = WatcherSet::new()
            .with("success", after(Duration::from_millis(200), 1))
            .with("timeout", timeout(Duration::from_millis(100)));

        let result = race(set).await.unwrap();

        assert!(result.is_timed_out());
        assert_eq!(result.winner_name(), None);
        assert_eq!(result.value, None);
    }

    #[tokio::test]
    async fn simultaneous_settlements_commit_to_first_registered() {
        let set = WatcherSet::new()
            .with("first", Watcher::resolves(async { "x" }))
            .with("second", Watcher::resolves(async { "y" }));

        let result = race(set).await.unwrap();

        assert_eq!(result.winner_name(), Some("first"));
        assert_eq!(result.value, Some("x"));
    }

    #[tokio::test]
    async fn empty_set_is_rejected() {
        let result = race(WatcherSet::<u32>::new()).await;
        assert!(matches!(result, Err(RaceError::Empty)));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_before_commit_propagates() {
        let set: WatcherSet<u32> = WatcherSet::new()
            .with("error", Watcher::fails(async { "selector vanished" }))
            .with("success", after(Duration::from_millis(10), 1));

        let result = race(set).await;

        match result {
            Err(RaceError::WatcherFailed { name, source }) => {
                assert_eq!(name, "error");
                assert_eq!(source.to_string(), "selector vanished");
            }
            other => panic!("Expected WatcherFailed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failure_after_commit_is_ignored() {
        let set: WatcherSet<u32> = WatcherSet::new()
            .with("success", after(Duration::from_millis(5), 1))
            .with(
                "error",
                Watcher::started(async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err(CollaboratorError::from("too late"))
                }),
            );

        let result = race(set).await.unwrap();
        assert_eq!(result.winner_name(), Some("success"));

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn detached_losers_run_to_completion() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let set: WatcherSet<u32> = WatcherSet::new()
            .with("fast", after(Duration::from_millis(1), 1))
            .with(
                "slow",
                Watcher::resolves(async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    flag.store(true, Ordering::SeqCst);
                    2
                }),
            );

        let result = race_with(set, LoserPolicy::Detach).await.unwrap();
        assert_eq!(result.value, Some(1));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn detached_bounded_poll_stops_after_its_budget() {
        let checks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&checks);

        let set: WatcherSet<u32> = WatcherSet::new()
            .with("fast", after(Duration::from_millis(1), 1))
            .with(
                "error",
                poll(
                    move || {
                        counter.fetch_add(1, Ordering::SeqCst);
                        None
                    },
                    Duration::from_millis(100),
                    Duration::from_millis(10),
                ),
            );

        race_with(set, LoserPolicy::Detach).await.unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        let settled = checks.load(Ordering::SeqCst);
        assert!(settled > 1);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(checks.load(Ordering::SeqCst), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_losers_never_complete() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let set: WatcherSet<u32> = WatcherSet::new()
            .with("fast", after(Duration::from_millis(1), 1))
            .with(
                "slow",
                Watcher::resolves(async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    flag.store(true, Ordering::SeqCst);
                    2
                }),
            )
            .with("never", pending());

        race_with(set, LoserPolicy::Drop).await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
