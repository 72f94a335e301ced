//! Transaction engine error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum TransactionError {
    #[error("operation on {reference} skipped: {message}")]
    Skipped { reference: String, message: String },

    #[error("{reference} is not installed")]
    NotInstalled { reference: String },

    #[error("failed to {kind} {reference}: {message}")]
    OperationFailed {
        reference: String,
        kind: String,
        message: String,
    },

    #[error("failed to rebase {old_ref} to {new_ref}: {message}")]
    RebaseFailed {
        old_ref: String,
        new_ref: String,
        message: String,
    },

    #[error("unknown operation kind: {kind}")]
    UnknownOperationKind { kind: String },

    #[error("invalid transaction plan: {message}")]
    InvalidPlan { message: String },

    #[error("transaction aborted: {message}")]
    Aborted { message: String },

    #[error("transaction failed: {message}")]
    RunFailed { message: String },

    #[error("transaction has already been run")]
    AlreadyRun,
}

impl UserFacingError for TransactionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::OperationFailed { .. } | Self::RunFailed { .. } => {
                Some("Retry the transaction; apps have been restored to their previous state.")
            }
            Self::InvalidPlan { .. } | Self::UnknownOperationKind { .. } => {
                Some("Fix the transaction plan and retry.")
            }
            Self::AlreadyRun => Some("Create a new transaction for each run."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::OperationFailed { .. } | Self::RunFailed { .. } | Self::Aborted { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Skipped { .. } => "transaction.skipped",
            Self::NotInstalled { .. } => "transaction.not_installed",
            Self::OperationFailed { .. } => "transaction.operation_failed",
            Self::RebaseFailed { .. } => "transaction.rebase_failed",
            Self::UnknownOperationKind { .. } => "transaction.unknown_operation_kind",
            Self::InvalidPlan { .. } => "transaction.invalid_plan",
            Self::Aborted { .. } => "transaction.aborted",
            Self::RunFailed { .. } => "transaction.run_failed",
            Self::AlreadyRun => "transaction.already_run",
        };
        Some(code)
    }
}
