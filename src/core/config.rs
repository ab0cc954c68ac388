//! Machine configuration.

use crate::race::LoserPolicy;
use serde::{Deserialize, Serialize};

/// Name of the state entered when a race's deadline wins.
pub const DEFAULT_TIMEOUT_STATE: &str = "timeout";

/// Tunables for a [`StateMachine`](crate::effects::StateMachine).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use raceway::core::MachineConfig;
/// use raceway::race::LoserPolicy;
///
/// let config = MachineConfig::from_json(r#"{ "loser_policy": "drop" }"#).unwrap();
/// assert_eq!(config.timeout_state, "timeout");
/// assert_eq!(config.loser_policy, LoserPolicy::Drop);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// State entered when the deadline watcher wins.
    pub timeout_state: String,

    /// What happens to watchers that lose a race.
    pub loser_policy: LoserPolicy,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn timeout_state(mut self, name: impl Into<String>) -> Self {
        self.timeout_state = name.into();
        self
    }

    pub fn loser_policy(mut self, policy: LoserPolicy) -> Self {
        self.loser_policy = policy;
        self
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            timeout_state: DEFAULT_TIMEOUT_STATE.to_string(),
            loser_policy: LoserPolicy::Detach,
        }
    }
}
