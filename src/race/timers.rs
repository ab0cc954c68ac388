//! Timer-backed watchers.
//!
//! Deadlines are ordinary watchers: the entry action of a state arms a
//! [`timeout`] next to its real watchers, and if the timer settles first the
//! race reports the timeout sentinel.

use crate::race::watcher::{Settlement, Watcher};
use std::time::Duration;
use tokio::time::Instant;

/// Suspend for `duration`.
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Deadline watcher: settles with [`Settlement::TimedOut`] after `budget`.
pub fn timeout<T: Send + 'static>(budget: Duration) -> Watcher<T> {
    Watcher::factory(move || async move {
        tokio::time::sleep(budget).await;
        Ok(Settlement::TimedOut)
    })
}

/// Settles with `value` after `delay`.
pub fn after<T>(delay: Duration, value: T) -> Watcher<T>
where
    T: Clone + Send + Sync + 'static,
{
    Watcher::factory(move || {
        let value = value.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok(Settlement::Value(value))
        }
    })
}

/// Never settles. Holds a slot in a set without ever winning.
///
/// Under [`LoserPolicy::Detach`](crate::race::LoserPolicy::Detach) each
/// losing copy is kept on the runtime until it shuts down.
pub fn pending<T: Send + 'static>() -> Watcher<T> {
    Watcher::factory(|| futures::future::pending())
}

/// Poll a synchronous condition every `interval` until it yields `Some`.
///
/// The condition is checked immediately, then after each interval. Once more
/// than `budget` has elapsed without a match the watcher settles with
/// [`Settlement::TimedOut`]. A zero `budget` polls forever, including
/// after losing a detached race.
pub fn poll<T, F>(condition: F, budget: Duration, interval: Duration) -> Watcher<T>
where
    T: Send + 'static,
    F: Fn() -> Option<T> + Send + Sync + Clone + 'static,
{
    Watcher::factory(move || {
        let condition = condition.clone();
        async move {
            let started = Instant::now();
            loop {
                if let Some(value) = condition() {
                    return Ok(Settlement::Value(value));
                }
                if !budget.is_zero() && started.elapsed() > budget {
                    return Ok(Settlement::TimedOut);
                }
                tokio::time::sleep(interval).await;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn timeout_settles_as_timed_out() {
        let settled = timeout::<u32>(Duration::from_millis(100))
            .launch()
            .await
            .unwrap();
        assert_eq!(settled, Settlement::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn after_settles_with_value() {
        let begin = Instant::now();
        let settled = after(Duration::from_millis(30), "done")
            .launch()
            .await
            .unwrap();

        assert_eq!(settled, Settlement::Value("done"));
        assert!(begin.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_returns_first_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let condition = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            (n >= 3).then_some(n)
        };

        let settled = poll(condition, Duration::from_secs(1), Duration::from_millis(4))
            .launch()
            .await
            .unwrap();

        assert_eq!(settled, Settlement::Value(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_times_out_when_condition_never_holds() {
        let settled = poll(|| None::<u32>, Duration::from_millis(50), Duration::from_millis(4))
            .launch()
            .await
            .unwrap();

        assert_eq!(settled, Settlement::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_never_settles() {
        let never = pending::<u32>().launch();
        let result = tokio::time::timeout(Duration::from_secs(60), never).await;
        assert!(result.is_err());
    }
}
