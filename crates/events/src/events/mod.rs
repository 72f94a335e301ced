use serde::{Deserialize, Serialize};

use crate::EventSource;
use txflow_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureContext {
    /// Stable error code, when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            hint: None,
            retryable: false,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self {
            code: error.user_code().map(Into::into),
            message: error.user_message().into_owned(),
            hint: error.user_hint().map(Into::into),
            retryable: error.is_retryable(),
        }
    }
}

pub mod general;
pub mod lifecycle;
pub mod progress;
pub mod transaction;

pub use general::*;
pub use lifecycle::*;
pub use progress::*;
pub use transaction::*;

/// Top-level application event enum that aggregates all domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Warnings not tied to an operation
    General(GeneralEvent),

    /// Session-level events (run started, plan ready, first error, rebases)
    Transaction(TransactionEvent),

    /// Per-operation and per-app state events
    Lifecycle(LifecycleEvent),

    /// Per-app progress aggregation events
    Progress(ProgressEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Transaction(_) => EventSource::TRANSACTION,
            Self::Lifecycle(_) => EventSource::LIFECYCLE,
            Self::Progress(_) => EventSource::PROGRESS,
        }
    }

    /// The operation ref this event is about, if any.
    #[must_use]
    pub fn correlation(&self) -> Option<&str> {
        match self {
            Self::General(_) => None,
            Self::Transaction(event) => event.reference(),
            Self::Lifecycle(event) => Some(event.reference()),
            Self::Progress(event) => Some(event.reference()),
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Transaction(
                TransactionEvent::Failed { .. } | TransactionEvent::FirstErrorCaptured { .. },
            )
            | Self::Lifecycle(LifecycleEvent::OperationFailed { fatal: true, .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Transaction(
                TransactionEvent::UnresolvedRef { .. } | TransactionEvent::EndOfLife { .. },
            )
            | Self::Lifecycle(
                LifecycleEvent::OperationFailed { fatal: false, .. }
                | LifecycleEvent::OperationCancelled { .. }
                | LifecycleEvent::StateChangeRejected { .. },
            )
            | Self::Progress(ProgressEvent::Discarded { .. }) => Level::WARN,

            Self::Transaction(TransactionEvent::RebaseSkipped { .. })
            | Self::Lifecycle(
                LifecycleEvent::OperationSkipped { .. }
                | LifecycleEvent::StateChanged { .. }
                | LifecycleEvent::SkippedDependencyInstalled { .. },
            )
            | Self::Progress(ProgressEvent::Unknown { .. }) => Level::DEBUG,

            Self::Progress(ProgressEvent::Changed { .. }) => Level::TRACE,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "txflow::events::general",
            Self::Transaction(_) => "txflow::events::transaction",
            Self::Lifecycle(_) => "txflow::events::lifecycle",
            Self::Progress(_) => "txflow::events::progress",
        }
    }
}

impl From<GeneralEvent> for AppEvent {
    fn from(event: GeneralEvent) -> Self {
        Self::General(event)
    }
}

impl From<TransactionEvent> for AppEvent {
    fn from(event: TransactionEvent) -> Self {
        Self::Transaction(event)
    }
}

impl From<LifecycleEvent> for AppEvent {
    fn from(event: LifecycleEvent) -> Self {
        Self::Lifecycle(event)
    }
}

impl From<ProgressEvent> for AppEvent {
    fn from(event: ProgressEvent) -> Self {
        Self::Progress(event)
    }
}
