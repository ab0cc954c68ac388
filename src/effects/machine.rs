//! State machine that drives the enter → race → transition loop.

use crate::core::{
    Entry, MachineConfig, StateDescriptor, StateGraph, StateHistory, StateTransition, Trigger,
};
use crate::effects::error::MachineError;
use crate::effects::stop::StopHandle;
use crate::race::{race_with, RaceError, WatcherSet, Winner};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use stillwater::effect::Effect;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

/// Machine-level lifecycle.
///
/// `Running` is held for the whole loop. `Terminal`, `Stopped` and `Failed`
/// are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    Idle,
    Running,
    Terminal,
    Stopped,
    Failed,
}

/// How a run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// A terminal state was entered.
    Terminal { state: String },

    /// The stop flag was observed while in this state.
    Stopped { state: String },
}

impl RunOutcome {
    /// The state the loop ended in.
    pub fn state(&self) -> &str {
        match self {
            RunOutcome::Terminal { state } | RunOutcome::Stopped { state } => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunOutcome::Terminal { .. })
    }
}

/// Race-driven state machine.
///
/// Each non-terminal state's entry action arms a [`WatcherSet`]; the machine
/// races it and moves to the state named by the winner, or to the configured
/// timeout state when a deadline wins. There is no edge table: the graph only
/// decides which names are legal targets.
///
/// The caller's `Env` is handed to entry actions by reference. The machine
/// never reads or writes it.
pub struct StateMachine<T, Env> {
    states: StateGraph<T, Env>,
    current: Option<String>,
    status: MachineStatus,
    stop: StopHandle,
    standing: WatcherSet<T>,
    history: StateHistory,
    config: MachineConfig,
    run_id: Uuid,
}

impl<T, Env> StateMachine<T, Env>
where
    T: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Create an idle machine with an empty graph.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            states: StateGraph::new(),
            current: None,
            status: MachineStatus::Idle,
            stop: StopHandle::new(),
            standing: WatcherSet::new(),
            history: StateHistory::new(),
            config,
            run_id: Uuid::new_v4(),
        }
    }

    /// Replace the state graph. Names are only checked when transitioned to.
    pub fn set_states(&mut self, states: StateGraph<T, Env>) {
        self.states = states;
    }

    /// Watchers raced in states whose entry action arms nothing.
    ///
    /// Started watchers take part in the first such race only. Factory
    /// watchers are re-armed for every one.
    pub fn set_standing_watchers(&mut self, watchers: WatcherSet<T>) {
        self.standing = watchers;
    }

    /// Request a cooperative stop.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Handle for stopping the machine from entry actions, watchers or
    /// other tasks while `start` is running.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn states(&self) -> &StateGraph<T, Env> {
        &self.states
    }

    /// Identifier attached to this run's tracing span.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Run the control loop from `initial` until a terminal state is entered
    /// or the stop flag is observed.
    ///
    /// Entry actions are always awaited before their watchers are raced.
    /// After a state's entry action, a terminal flag ends the run first; a
    /// stop requested before that entry began ends it next, without racing.
    /// Otherwise the armed watchers are raced exactly once and a stop
    /// requested meanwhile ends the run in the same state, discarding the
    /// winner.
    pub async fn start(&mut self, initial: &str, env: &Env) -> Result<RunOutcome, MachineError> {
        if self.status != MachineStatus::Idle {
            return Err(MachineError::AlreadyStarted);
        }
        self.status = MachineStatus::Running;

        let span = info_span!("race_machine", run_id = %self.run_id);
        let result = self.run(initial, env).instrument(span).await;

        self.status = match &result {
            Ok(RunOutcome::Terminal { .. }) => MachineStatus::Terminal,
            Ok(RunOutcome::Stopped { .. }) => MachineStatus::Stopped,
            Err(_) => MachineStatus::Failed,
        };
        result
    }

    async fn run(&mut self, initial: &str, env: &Env) -> Result<RunOutcome, MachineError> {
        let mut next = initial.to_string();
        let mut trigger = Trigger::Start;

        loop {
            let descriptor = self.change_state(&next, trigger)?;
            let state = next;

            let stop_requested = self.stop.is_stopped();
            let armed = enter(&state, &descriptor.entry, env).await?;

            if descriptor.terminal {
                info!(state = %state, "terminal state reached");
                return Ok(RunOutcome::Terminal { state });
            }
            if stop_requested {
                info!(state = %state, "stopped before racing");
                return Ok(RunOutcome::Stopped { state });
            }

            let watchers = if armed.is_empty() {
                self.take_standing()
            } else {
                armed
            };
            debug!(state = %state, watchers = ?watchers.names(), "racing");

            let result = race_with(watchers, self.config.loser_policy)
                .await
                .map_err(|err| match err {
                    RaceError::Empty => MachineError::NoWatchers {
                        state: state.clone(),
                    },
                    RaceError::WatcherFailed { name, source } => MachineError::WatcherFailed {
                        state: state.clone(),
                        watcher: name,
                        source,
                    },
                })?;

            if self.stop.is_stopped() {
                info!(state = %state, winner = ?result.winner, "stopped, winner discarded");
                return Ok(RunOutcome::Stopped { state });
            }

            (next, trigger) = match result.winner {
                Winner::Named(name) => (name.clone(), Trigger::Watcher(name)),
                Winner::TimedOut => (self.config.timeout_state.clone(), Trigger::Timeout),
            };
        }
    }

    /// Validate `name` and make it the current state, returning its descriptor.
    fn change_state(
        &mut self,
        name: &str,
        trigger: Trigger,
    ) -> Result<StateDescriptor<T, Env>, MachineError> {
        let descriptor = match self.states.get(name) {
            Some(descriptor) => descriptor.clone(),
            None => return Err(self.invalid_transition(name)),
        };

        let from = self.current.replace(name.to_string());
        debug!(from = ?from, to = %name, trigger = ?trigger, "entering state");
        self.history = self.history.record(StateTransition {
            from,
            to: name.to_string(),
            trigger,
            timestamp: Utc::now(),
        });
        Ok(descriptor)
    }

    /// Standing watchers for the next race.
    ///
    /// Started watchers are consumed by the first race that uses the set;
    /// factories stay behind for later races.
    fn take_standing(&mut self) -> WatcherSet<T> {
        let standing = std::mem::take(&mut self.standing);
        self.standing = standing.rearm();
        standing
    }

    fn invalid_transition(&self, name: &str) -> MachineError {
        MachineError::InvalidTransition {
            name: name.to_string(),
            valid: self.states.names(),
        }
    }
}

impl<T, Env> Default for StateMachine<T, Env>
where
    T: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Run a state's entry action to completion and collect what it armed.
async fn enter<T, Env>(
    state: &str,
    entry: &Entry<T, Env>,
    env: &Env,
) -> Result<WatcherSet<T>, MachineError>
where
    T: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    let armed = match entry {
        Entry::None => Ok(WatcherSet::new()),
        Entry::Async(action) => action(env).await,
        Entry::Effect(factory) => factory().run(env).await,
    };

    armed.map_err(|source| MachineError::EntryFailed {
        state: state.to_string(),
        source,
    })
}
