//! State descriptors and the state graph.
//!
//! A state is identified by its name (the key in the [`StateGraph`]). Its
//! descriptor carries an optional entry action and a terminal flag. The entry
//! action is resolved once, when the descriptor is built: a state without one
//! holds [`Entry::None`], which arms nothing.

use crate::race::{CollaboratorError, WatcherSet};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use stillwater::effect::BoxedEffect;

/// Future returned by an async entry action: the watchers it armed.
pub type EntryFuture<T> = BoxFuture<'static, Result<WatcherSet<T>, CollaboratorError>>;

/// Async entry action. Receives the caller's environment by reference and
/// returns a future that performs the state's side effects and yields the
/// watchers for the upcoming race.
pub type AsyncEntry<T, Env> = Arc<dyn Fn(&Env) -> EntryFuture<T> + Send + Sync>;

/// Effect-based entry action. A factory producing a fresh effect per entry,
/// run against the caller's environment.
pub type EffectEntry<T, Env> =
    Arc<dyn Fn() -> BoxedEffect<WatcherSet<T>, CollaboratorError, Env> + Send + Sync>;

/// What runs when a state is entered.
pub enum Entry<T, Env> {
    /// No entry action. Arms nothing.
    None,

    /// Async closure over the environment.
    Async(AsyncEntry<T, Env>),

    /// Stillwater effect factory.
    Effect(EffectEntry<T, Env>),
}

impl<T, Env> Entry<T, Env> {
    /// Wrap an async closure as an entry action.
    pub fn from_async<F, Fut>(action: F) -> Self
    where
        F: Fn(&Env) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WatcherSet<T>, CollaboratorError>> + Send + 'static,
        T: 'static,
        Env: 'static,
    {
        Entry::Async(Arc::new(move |env: &Env| -> EntryFuture<T> { Box::pin(action(env)) }))
    }

    /// Wrap an effect factory as an entry action.
    pub fn from_effect<F>(factory: F) -> Self
    where
        F: Fn() -> BoxedEffect<WatcherSet<T>, CollaboratorError, Env> + Send + Sync + 'static,
        T: 'static,
        Env: 'static,
    {
        Entry::Effect(Arc::new(factory))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Entry::None)
    }
}

impl<T, Env> Clone for Entry<T, Env> {
    fn clone(&self) -> Self {
        match self {
            Entry::None => Entry::None,
            Entry::Async(action) => Entry::Async(Arc::clone(action)),
            Entry::Effect(factory) => Entry::Effect(Arc::clone(factory)),
        }
    }
}

impl<T, Env> Default for Entry<T, Env> {
    fn default() -> Self {
        Entry::None
    }
}

impl<T, Env> std::fmt::Debug for Entry<T, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Entry::None => "None",
            Entry::Async(_) => "Async",
            Entry::Effect(_) => "Effect",
        };
        f.debug_tuple("Entry").field(&kind).finish()
    }
}

/// Descriptor of a single state.
///
/// A terminal descriptor is never raced: once its entry action has run, the
/// control loop ends.
pub struct StateDescriptor<T, Env> {
    pub entry: Entry<T, Env>,
    pub terminal: bool,
}

impl<T, Env> StateDescriptor<T, Env> {
    /// Non-terminal state with no entry action.
    pub fn new() -> Self {
        Self {
            entry: Entry::None,
            terminal: false,
        }
    }

    /// Terminal state with no entry action.
    pub fn terminal() -> Self {
        Self {
            entry: Entry::None,
            terminal: true,
        }
    }

    pub fn with_entry(mut self, entry: Entry<T, Env>) -> Self {
        self.entry = entry;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl<T, Env> Default for StateDescriptor<T, Env> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Env> Clone for StateDescriptor<T, Env> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
            terminal: self.terminal,
        }
    }
}

impl<T, Env> std::fmt::Debug for StateDescriptor<T, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateDescriptor")
            .field("entry", &self.entry)
            .field("terminal", &self.terminal)
            .finish()
    }
}

/// Mapping from state name to descriptor.
///
/// Kept sorted by name so that diagnostics listing the valid names are
/// stable across runs.
pub struct StateGraph<T, Env> {
    states: BTreeMap<String, StateDescriptor<T, Env>>,
}

impl<T, Env> StateGraph<T, Env> {
    pub fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Insert or replace a state, returning the previous descriptor.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: StateDescriptor<T, Env>,
    ) -> Option<StateDescriptor<T, Env>> {
        self.states.insert(name.into(), descriptor)
    }

    pub fn get(&self, name: &str) -> Option<&StateDescriptor<T, Env>> {
        self.states.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// State names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.states.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateDescriptor<T, Env>)> {
        self.states.iter().map(|(name, desc)| (name.as_str(), desc))
    }
}

impl<T, Env> Default for StateGraph<T, Env> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Env> Clone for StateGraph<T, Env> {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
        }
    }
}

impl<T, Env> std::fmt::Debug for StateGraph<T, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.states.iter()).finish()
    }
}

impl<T, Env, N: Into<String>> FromIterator<(N, StateDescriptor<T, Env>)> for StateGraph<T, Env> {
    fn from_iter<I: IntoIterator<Item = (N, StateDescriptor<T, Env>)>>(iter: I) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|(name, desc)| (name.into(), desc))
                .collect(),
        }
    }
}
