//! Builders for state descriptors and graphs.

use crate::builder::error::BuildError;
use crate::core::{Entry, StateDescriptor, StateGraph};
use crate::race::{CollaboratorError, WatcherSet};
use std::future::Future;
use stillwater::effect::BoxedEffect;

/// Builder for a single state descriptor.
pub struct StateBuilder<T, Env> {
    entry: Entry<T, Env>,
    terminal: bool,
}

impl<T, Env> StateBuilder<T, Env> {
    pub fn new() -> Self {
        Self {
            entry: Entry::None,
            terminal: false,
        }
    }

    /// Set an async entry action. It must return the watchers to race.
    pub fn entry<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(&Env) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<WatcherSet<T>, CollaboratorError>> + Send + 'static,
        T: 'static,
        Env: 'static,
    {
        self.entry = Entry::from_async(action);
        self
    }

    /// Set an effect-producing entry action.
    pub fn entry_effect<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> BoxedEffect<WatcherSet<T>, CollaboratorError, Env> + Send + Sync + 'static,
        T: 'static,
        Env: 'static,
    {
        self.entry = Entry::from_effect(factory);
        self
    }

    /// Arm the watchers produced by `watchers` on every entry, with no other
    /// side effects.
    pub fn arms<F>(self, watchers: F) -> Self
    where
        F: Fn() -> WatcherSet<T> + Send + Sync + 'static,
        T: Send + 'static,
        Env: 'static,
    {
        self.entry(move |_env: &Env| {
            let armed = watchers();
            async move { Ok(armed) }
        })
    }

    /// Mark the state terminal.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn build(self) -> StateDescriptor<T, Env> {
        StateDescriptor {
            entry: self.entry,
            terminal: self.terminal,
        }
    }
}

impl<T, Env> Default for StateBuilder<T, Env> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a state graph with a fluent API.
pub struct StateGraphBuilder<T, Env> {
    states: Vec<(String, StateDescriptor<T, Env>)>,
}

impl<T, Env> StateGraphBuilder<T, Env> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Add a state from a builder.
    pub fn state(mut self, name: impl Into<String>, builder: StateBuilder<T, Env>) -> Self {
        self.states.push((name.into(), builder.build()));
        self
    }

    /// Add a pre-built descriptor.
    pub fn descriptor(mut self, name: impl Into<String>, descriptor: StateDescriptor<T, Env>) -> Self {
        self.states.push((name.into(), descriptor));
        self
    }

    /// Build the graph.
    /// Returns an error if no state was added or a name was used twice.
    pub fn build(self) -> Result<StateGraph<T, Env>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut graph = StateGraph::new();
        for (name, descriptor) in self.states {
            if graph.contains(&name) {
                return Err(BuildError::DuplicateState(name));
            }
            graph.insert(name, descriptor);
        }
        Ok(graph)
    }
}

impl<T, Env> Default for StateGraphBuilder<T, Env> {
    fn default() -> Self {
        Self::new()
    }
}
