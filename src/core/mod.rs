//! Core state machine types.
//!
//! This module contains the plain data the control loop works on:
//! - State descriptors and the state graph
//! - Immutable transition history
//! - Machine configuration
//!
//! Nothing here runs a race or touches a collaborator.

mod config;
mod history;
mod state;

pub use config::{MachineConfig, DEFAULT_TIMEOUT_STATE};
pub use history::{StateHistory, StateTransition, Trigger};
pub use state::{AsyncEntry, EffectEntry, Entry, EntryFuture, StateDescriptor, StateGraph};
