//! Named watchers and the sets they are raced in.

use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Error type produced by collaborators (entry actions and watchers).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// How a watcher settled.
///
/// `TimedOut` is the deadline marker: a watcher that settles with it makes
/// the timeout sentinel the winner, whatever name it was registered under.
/// `Value` wins under the watcher's own name, whatever the value is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Settlement<T> {
    Value(T),
    TimedOut,
}

impl<T> Settlement<T> {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Settlement::TimedOut)
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Settlement::Value(value) => Some(value),
            Settlement::TimedOut => None,
        }
    }
}

/// Future driven by the race scheduler.
pub type WatcherFuture<T> = BoxFuture<'static, Result<Settlement<T>, CollaboratorError>>;

/// Zero-argument factory that starts a watcher on demand.
pub type WatcherFactory<T> = Arc<dyn Fn() -> WatcherFuture<T> + Send + Sync>;

/// A single asynchronous operation that may win a race.
pub enum Watcher<T> {
    /// Already-started operation. Consumed by the race it takes part in.
    Started(WatcherFuture<T>),

    /// Factory invoked when the race begins. Can be re-armed for later races.
    Factory(WatcherFactory<T>),
}

impl<T> Watcher<T> {
    /// Wrap a fallible future that reports its own settlement.
    pub fn started<F>(future: F) -> Self
    where
        F: Future<Output = Result<Settlement<T>, CollaboratorError>> + Send + 'static,
    {
        Watcher::Started(Box::pin(future))
    }

    /// Wrap an infallible future; its output wins under the watcher's name.
    pub fn resolves<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: 'static,
    {
        Watcher::Started(Box::pin(async move { Ok(Settlement::Value(future.await)) }))
    }

    /// Wrap a future that fails the race if it settles first.
    pub fn fails<F, E>(future: F) -> Self
    where
        F: Future<Output = E> + Send + 'static,
        E: Into<CollaboratorError>,
        T: 'static,
    {
        Watcher::Started(Box::pin(async move { Err(future.await.into()) }))
    }

    /// Wrap a factory so the operation starts only when raced.
    pub fn factory<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Settlement<T>, CollaboratorError>> + Send + 'static,
        T: 'static,
    {
        Watcher::Factory(Arc::new(move || -> WatcherFuture<T> { Box::pin(factory()) }))
    }

    /// Start the operation (no-op for already-started ones).
    pub(crate) fn launch(self) -> WatcherFuture<T> {
        match self {
            Watcher::Started(future) => future,
            Watcher::Factory(factory) => factory(),
        }
    }

    /// A fresh copy of a factory watcher. Started watchers cannot be re-armed.
    pub fn rearm(&self) -> Option<Self> {
        match self {
            Watcher::Started(_) => None,
            Watcher::Factory(factory) => Some(Watcher::Factory(Arc::clone(factory))),
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Watcher::Factory(_))
    }
}

impl<T> std::fmt::Debug for Watcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Watcher::Started(_) => f.write_str("Watcher::Started"),
            Watcher::Factory(_) => f.write_str("Watcher::Factory"),
        }
    }
}

/// The collection of watchers armed for one race.
///
/// Names are unique and kept in insertion order; that order is the race's
/// tie-break when several watchers are ready in the same poll.
pub struct WatcherSet<T> {
    entries: Vec<(String, Watcher<T>)>,
}

impl<T> WatcherSet<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a watcher. Re-using a name replaces the earlier watcher in
    /// place and returns it.
    pub fn insert(&mut self, name: impl Into<String>, watcher: Watcher<T>) -> Option<Watcher<T>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, watcher)),
            None => {
                self.entries.push((name, watcher));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, watcher: Watcher<T>) -> Self {
        self.insert(name, watcher);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Watcher<T>> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the factory watchers in this set, ready for another race.
    pub fn rearm(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter_map(|(name, watcher)| watcher.rearm().map(|w| (name.clone(), w)))
                .collect(),
        }
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Watcher<T>)> {
        self.entries
    }
}

impl<T> Default for WatcherSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for WatcherSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, watcher)| (name, watcher)))
            .finish()
    }
}

impl<T, N: Into<String>> FromIterator<(N, Watcher<T>)> for WatcherSet<T> {
    fn from_iter<I: IntoIterator<Item = (N, Watcher<T>)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, watcher) in iter {
            set.insert(name, watcher);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_names_unique() {
        let mut set: WatcherSet<u32> = WatcherSet::new();
        assert!(set.insert("a", Watcher::resolves(async { 1 })).is_none());
        assert!(set.insert("b", Watcher::resolves(async { 2 })).is_none());
        assert!(set.insert("a", Watcher::resolves(async { 3 })).is_some());

        assert_eq!(set.names(), vec!["a", "b"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_drops_named_watcher() {
        let mut set: WatcherSet<u32> = WatcherSet::new()
            .with("a", Watcher::resolves(async { 1 }))
            .with("b", Watcher::resolves(async { 2 }));

        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert!(!set.contains("a"));
        assert!(set.contains("b"));
    }

    #[test]
    fn rearm_keeps_only_factories() {
        let set: WatcherSet<u32> = WatcherSet::new()
            .with("started", Watcher::resolves(async { 1 }))
            .with(
                "factory",
                Watcher::factory(|| async { Ok(Settlement::Value(2)) }),
            );

        let rearmed = set.rearm();
        assert_eq!(rearmed.names(), vec!["factory"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn settlement_value_extraction() {
        assert_eq!(Settlement::Value(0).into_value(), Some(0));
        assert_eq!(Settlement::<u32>::TimedOut.into_value(), None);
        assert!(Settlement::<u32>::TimedOut.is_timed_out());
        assert!(!Settlement::Value(()).is_timed_out());
    }

    #[tokio::test]
    async fn factory_starts_a_fresh_operation_each_launch() {
        let watcher: Watcher<&'static str> =
            Watcher::factory(|| async { Ok(Settlement::Value("ready")) });

        let first = watcher.rearm().unwrap().launch().await.unwrap();
        let second = watcher.launch().await.unwrap();

        assert_eq!(first, Settlement::Value("ready"));
        assert_eq!(second, Settlement::Value("ready"));
    }
}
