use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Session-level transaction events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TransactionEvent {
    /// `run()` was entered
    Started {
        stop_on_first_error: bool,
        no_deploy: bool,
    },

    /// The runner finalized its plan
    Ready { operations: usize, apps: usize },

    /// The run finished without a captured error
    Completed { operations: usize },

    /// The run failed; `failure` is the error handed back to the host
    Failed {
        failure: FailureContext,
        recovered_apps: usize,
    },

    /// The first fatal error of the session was recorded
    FirstErrorCaptured {
        reference: String,
        failure: FailureContext,
    },

    /// The runner reported a ref as end-of-life
    EndOfLife {
        reference: String,
        reason: Option<String>,
        rebased_to: Option<String>,
    },

    /// A rebase-and-uninstall was queued for an end-of-life ref
    RebaseQueued {
        old_ref: String,
        new_ref: String,
        remote: String,
    },

    /// The end-of-life ref was not installed, so there was nothing to rebase
    RebaseSkipped { old_ref: String, new_ref: String },

    /// An operation's ref could not be mapped to any app
    UnresolvedRef { reference: String },
}

impl TransactionEvent {
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::FirstErrorCaptured { reference, .. }
            | Self::EndOfLife { reference, .. }
            | Self::UnresolvedRef { reference } => Some(reference),
            Self::RebaseQueued { old_ref, .. } | Self::RebaseSkipped { old_ref, .. } => {
                Some(old_ref)
            }
            Self::Started { .. } | Self::Ready { .. } | Self::Completed { .. } | Self::Failed { .. } => {
                None
            }
        }
    }
}
