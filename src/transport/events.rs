//! Transport Events
//!
//! Working-state and error notifications broadcast to subscribers.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whether a request is outstanding, and whether a caller's poll loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingState {
    pub is_working: bool,
    pub should_continue: bool,
}

impl Default for WorkingState {
    fn default() -> Self {
        Self {
            is_working: false,
            should_continue: true,
        }
    }
}

/// Events emitted by a transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransportEvent {
    /// Working state was set (fires on every call, changed or not)
    #[serde(rename_all = "camelCase")]
    Working {
        is_working: bool,
        should_continue: bool,
    },

    /// An error went through the transport's failure path
    Error { message: String },
}

impl From<WorkingState> for TransportEvent {
    fn from(state: WorkingState) -> Self {
        Self::Working {
            is_working: state.is_working,
            should_continue: state.should_continue,
        }
    }
}

/// Callback invoked on every working-state change with `(is_working, should_continue)`
pub type WorkingCallback = Box<dyn Fn(bool, bool) + Send + Sync>;

/// Overridable error hook
pub type ErrorHook = Arc<dyn Fn(&str) + Send + Sync>;
