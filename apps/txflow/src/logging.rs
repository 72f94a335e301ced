//! Structured logging integration for events
//!
//! Converts engine events into `tracing` records with structured fields so
//! that a JSON log file carries the same information as the event stream.

use txflow_events::{
    AppEvent, EventMessage, GeneralEvent, LifecycleEvent, ProgressEvent, TransactionEvent,
};
use tracing::{debug, error, info, trace, warn};

/// Log an `EventMessage` at the level its event maps to
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    match &message.event {
        AppEvent::General(GeneralEvent::Warning { message, context }) => {
            warn!(
                target: "txflow::events::general",
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                parent_id = ?meta.parent_id,
                context = %context,
                "{message}"
            );
        }

        AppEvent::Transaction(event) => log_transaction_event(message, event),
        AppEvent::Lifecycle(event) => log_lifecycle_event(message, event),

        AppEvent::Progress(event) => match event {
            ProgressEvent::Changed { reference, percent } => {
                trace!(
                    target: "txflow::events::progress",
                    event_id = %meta.event_id,
                    app = %reference,
                    percent = percent,
                    "Progress changed"
                );
            }
            ProgressEvent::Unknown { reference } => {
                debug!(
                    target: "txflow::events::progress",
                    event_id = %meta.event_id,
                    app = %reference,
                    "Progress unknown while estimating"
                );
            }
            ProgressEvent::Discarded {
                reference,
                current,
                computed,
            } => {
                warn!(
                    target: "txflow::events::progress",
                    event_id = %meta.event_id,
                    app = %reference,
                    current = current,
                    computed = computed,
                    "Progress went backwards, discarding update"
                );
            }
        },
    }
}

fn log_transaction_event(message: &EventMessage, event: &TransactionEvent) {
    let meta = &message.meta;
    match event {
        TransactionEvent::Started {
            stop_on_first_error,
            no_deploy,
        } => {
            info!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                stop_on_first_error = stop_on_first_error,
                no_deploy = no_deploy,
                "Transaction started"
            );
        }
        TransactionEvent::Ready { operations, apps } => {
            info!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                operations = operations,
                apps = apps,
                "Transaction ready"
            );
        }
        TransactionEvent::Completed { operations } => {
            info!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                operations = operations,
                "Transaction completed"
            );
        }
        TransactionEvent::Failed {
            failure,
            recovered_apps,
        } => {
            error!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                code = ?failure.code,
                message = %failure.message,
                hint = ?failure.hint,
                retryable = failure.retryable,
                recovered_apps = recovered_apps,
                "Transaction failed"
            );
        }
        TransactionEvent::FirstErrorCaptured { reference, failure } => {
            error!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %reference,
                code = ?failure.code,
                message = %failure.message,
                "First fatal error captured"
            );
        }
        TransactionEvent::EndOfLife {
            reference,
            reason,
            rebased_to,
        } => {
            warn!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                operation = %reference,
                reason = ?reason,
                rebased_to = ?rebased_to,
                "Operation targets an end-of-life ref"
            );
        }
        TransactionEvent::RebaseQueued {
            old_ref,
            new_ref,
            remote,
        } => {
            info!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                old_ref = %old_ref,
                new_ref = %new_ref,
                remote = %remote,
                "Rebase queued"
            );
        }
        TransactionEvent::RebaseSkipped { old_ref, new_ref } => {
            debug!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                old_ref = %old_ref,
                new_ref = %new_ref,
                "Rebase skipped, old ref not installed"
            );
        }
        TransactionEvent::UnresolvedRef { reference } => {
            warn!(
                target: "txflow::events::transaction",
                event_id = %meta.event_id,
                reference = %reference,
                "No app known for ref"
            );
        }
    }
}

fn log_lifecycle_event(message: &EventMessage, event: &LifecycleEvent) {
    let meta = &message.meta;
    match event {
        LifecycleEvent::OperationStarted { reference, kind } => {
            info!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                parent_id = ?meta.parent_id,
                operation = %reference,
                kind = %kind,
                "Operation started"
            );
        }
        LifecycleEvent::OperationCompleted {
            reference,
            kind,
            changed,
        } => {
            info!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                parent_id = ?meta.parent_id,
                operation = %reference,
                kind = %kind,
                changed = changed,
                "Operation completed"
            );
        }
        LifecycleEvent::OperationSkipped {
            reference,
            kind,
            message,
        } => {
            debug!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                parent_id = ?meta.parent_id,
                operation = %reference,
                kind = %kind,
                reason = %message,
                "Operation skipped"
            );
        }
        LifecycleEvent::OperationFailed {
            reference,
            kind,
            fatal,
            failure,
        } => {
            if *fatal {
                error!(
                    target: "txflow::events::lifecycle",
                    event_id = %meta.event_id,
                    parent_id = ?meta.parent_id,
                    operation = %reference,
                    kind = %kind,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    retryable = failure.retryable,
                    "Operation failed"
                );
            } else {
                warn!(
                    target: "txflow::events::lifecycle",
                    event_id = %meta.event_id,
                    parent_id = ?meta.parent_id,
                    operation = %reference,
                    kind = %kind,
                    code = ?failure.code,
                    message = %failure.message,
                    "Operation failed, continuing"
                );
            }
        }
        LifecycleEvent::OperationCancelled { reference, kind } => {
            warn!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                parent_id = ?meta.parent_id,
                operation = %reference,
                kind = %kind,
                "Operation cancelled"
            );
        }
        LifecycleEvent::StateChanged {
            reference,
            from,
            to,
        } => {
            debug!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                app = %reference,
                from = %from,
                to = %to,
                "App state changed"
            );
        }
        LifecycleEvent::StateChangeRejected {
            reference,
            from,
            to,
        } => {
            warn!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                app = %reference,
                from = %from,
                to = %to,
                "App state change rejected"
            );
        }
        LifecycleEvent::StateRecovered {
            reference,
            from,
            to,
        } => {
            info!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                app = %reference,
                from = %from,
                to = %to,
                "App state recovered"
            );
        }
        LifecycleEvent::SkippedDependencyInstalled { reference } => {
            debug!(
                target: "txflow::events::lifecycle",
                event_id = %meta.event_id,
                app = %reference,
                "Skipped dependency marked installed"
            );
        }
    }
}
