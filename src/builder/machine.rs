//! Builder for constructing state machines.

use crate::builder::error::BuildError;
use crate::builder::graph::StateGraphBuilder;
use crate::core::{MachineConfig, StateGraph};
use crate::effects::StateMachine;
use crate::race::{LoserPolicy, WatcherSet};

/// Builder for constructing state machines with a fluent API.
pub struct StateMachineBuilder<T, Env> {
    states: Option<StateGraph<T, Env>>,
    standing: WatcherSet<T>,
    config: MachineConfig,
}

impl<T, Env> StateMachineBuilder<T, Env>
where
    T: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: None,
            standing: WatcherSet::new(),
            config: MachineConfig::default(),
        }
    }

    /// Use a pre-built graph.
    pub fn states(mut self, states: StateGraph<T, Env>) -> Self {
        self.states = Some(states);
        self
    }

    /// Build the graph from a graph builder.
    /// Returns an error if the graph builder fails.
    pub fn graph(mut self, builder: StateGraphBuilder<T, Env>) -> Result<Self, BuildError> {
        self.states = Some(builder.build()?);
        Ok(self)
    }

    /// Watchers raced by states whose entry action arms nothing.
    ///
    /// Started watchers are raced once; factories are re-armed each time.
    pub fn standing(mut self, watchers: WatcherSet<T>) -> Self {
        self.standing = watchers;
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Name of the state entered when a deadline wins.
    pub fn timeout_state(mut self, name: impl Into<String>) -> Self {
        self.config.timeout_state = name.into();
        self
    }

    pub fn loser_policy(mut self, policy: LoserPolicy) -> Self {
        self.config.loser_policy = policy;
        self
    }

    /// Build the state machine.
    /// Returns an error if no states were supplied.
    pub fn build(self) -> Result<StateMachine<T, Env>, BuildError> {
        let states = self.states.ok_or(BuildError::NoStates)?;
        if states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let mut machine = StateMachine::with_config(self.config);
        machine.set_states(states);
        machine.set_standing_watchers(self.standing);
        Ok(machine)
    }
}

impl<T, Env> Default for StateMachineBuilder<T, Env>
where
    T: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::graph::StateBuilder;
    use crate::effects::MachineStatus;
    use crate::race::timers;
    use std::time::Duration;

    #[test]
    fn builder_requires_states() {
        let result = StateMachineBuilder::<u32, ()>::new().build();
        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_rejects_empty_graph() {
        let result = StateMachineBuilder::<u32, ()>::new()
            .states(StateGraph::new())
            .build();
        assert!(matches!(result, Err(BuildError::NoStates)));
    }

    #[test]
    fn builder_propagates_graph_errors() {
        let result = StateMachineBuilder::<u32, ()>::new().graph(
            StateGraphBuilder::new()
                .state("a", StateBuilder::new())
                .state("a", StateBuilder::new()),
        );
        assert!(matches!(result, Err(BuildError::DuplicateState(_))));
    }

    #[test]
    fn builder_applies_config() {
        let machine = StateMachineBuilder::<u32, ()>::new()
            .states(
                StateGraphBuilder::new()
                    .state("done", StateBuilder::new().terminal())
                    .build()
                    .unwrap(),
            )
            .timeout_state("expired")
            .loser_policy(LoserPolicy::Drop)
            .build()
            .unwrap();

        assert_eq!(machine.config().timeout_state, "expired");
        assert_eq!(machine.config().loser_policy, LoserPolicy::Drop);
        assert_eq!(machine.status(), MachineStatus::Idle);
        assert_eq!(machine.current_state(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn built_machine_runs() {
        let mut machine = StateMachineBuilder::<u32, ()>::new()
            .graph(
                StateGraphBuilder::new()
                    .state("wait", StateBuilder::new())
                    .state("done", StateBuilder::new().terminal()),
            )
            .unwrap()
            .standing(WatcherSet::new().with("done", timers::after(Duration::from_millis(5), 1)))
            .build()
            .unwrap();

        let outcome = machine.start("wait", &()).await.unwrap();
        assert_eq!(outcome.state(), "done");
    }
}
