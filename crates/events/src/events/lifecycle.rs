use serde::{Deserialize, Serialize};
use txflow_types::{AppState, OperationKind};

use super::FailureContext;

/// Per-operation and per-app lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LifecycleEvent {
    /// The runner started working on an operation
    OperationStarted {
        reference: String,
        kind: OperationKind,
    },

    /// An operation finished; `changed` is false when nothing needed doing
    OperationCompleted {
        reference: String,
        kind: OperationKind,
        changed: bool,
    },

    /// The operation turned out to be unnecessary
    OperationSkipped {
        reference: String,
        kind: OperationKind,
        message: String,
    },

    /// The operation failed; `fatal` is false when the runner tolerated it
    OperationFailed {
        reference: String,
        kind: OperationKind,
        fatal: bool,
        failure: FailureContext,
    },

    /// The operation was interrupted by cancellation
    OperationCancelled {
        reference: String,
        kind: OperationKind,
    },

    StateChanged {
        reference: String,
        from: AppState,
        to: AppState,
    },

    /// The app model refused a state change
    StateChangeRejected {
        reference: String,
        from: AppState,
        to: AppState,
    },

    /// App returned to its last stable state after a failure
    StateRecovered {
        reference: String,
        from: AppState,
        to: AppState,
    },

    /// A skipped operation's app was promoted to installed once its dependents finished
    SkippedDependencyInstalled { reference: String },
}

impl LifecycleEvent {
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::OperationStarted { reference, .. }
            | Self::OperationCompleted { reference, .. }
            | Self::OperationSkipped { reference, .. }
            | Self::OperationFailed { reference, .. }
            | Self::OperationCancelled { reference, .. }
            | Self::StateChanged { reference, .. }
            | Self::StateChangeRejected { reference, .. }
            | Self::StateRecovered { reference, .. }
            | Self::SkippedDependencyInstalled { reference } => reference,
        }
    }
}
