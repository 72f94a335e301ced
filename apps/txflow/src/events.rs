//! Event handling and progress display

use console::Style;
use txflow_events::{
    AppEvent, EventMessage, GeneralEvent, LifecycleEvent, ProgressEvent, TransactionEvent,
};

/// Severity of a console line, used to pick its style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Status,
    Progress,
    Warning,
    Error,
    Debug,
}

/// Event handler for progress display and user feedback
pub struct EventHandler {
    /// Whether to use colors in output
    colors_enabled: bool,
    /// Whether debug events are shown
    debug_enabled: bool,
    /// Suppress console lines entirely (JSON mode)
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            quiet,
        }
    }

    /// Handle an incoming event: log it, then show it if it is user-relevant
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);

        if self.quiet {
            return;
        }
        if let Some((kind, line)) = self.render(&message.event) {
            eprintln!("{}", self.style(kind).apply_to(line));
        }
    }

    fn style(&self, kind: LineKind) -> Style {
        if !self.colors_enabled {
            return Style::new();
        }
        match kind {
            LineKind::Status => Style::new().cyan(),
            LineKind::Progress | LineKind::Debug => Style::new().dim(),
            LineKind::Warning => Style::new().yellow(),
            LineKind::Error => Style::new().red().bold(),
        }
    }

    /// The console line for an event, if it gets one
    pub fn render(&self, event: &AppEvent) -> Option<(LineKind, String)> {
        match event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => Some((
                LineKind::Warning,
                format!("Warning: {message} ({context})"),
            )),
            AppEvent::Transaction(event) => self.render_transaction(event),
            AppEvent::Lifecycle(event) => self.render_lifecycle(event),
            AppEvent::Progress(event) => match event {
                ProgressEvent::Changed { reference, percent } => Some((
                    LineKind::Progress,
                    format!("  [{percent:>3}%] {reference}"),
                )),
                ProgressEvent::Unknown { reference } => Some((
                    LineKind::Progress,
                    format!("  [ ...] {reference}"),
                )),
                ProgressEvent::Discarded {
                    reference,
                    current,
                    computed,
                } => self.debug_line(format!(
                    "Ignored progress regression for {reference}: {current}% -> {computed}%"
                )),
            },
        }
    }

    fn render_transaction(&self, event: &TransactionEvent) -> Option<(LineKind, String)> {
        match event {
            TransactionEvent::Started { .. } => {
                Some((LineKind::Status, "Starting transaction".to_string()))
            }
            TransactionEvent::Ready { operations, apps } => Some((
                LineKind::Status,
                format!("Ready: {operations} operations, {apps} apps"),
            )),
            TransactionEvent::Completed { operations } => Some((
                LineKind::Status,
                format!("Transaction completed ({operations} operations)"),
            )),
            TransactionEvent::Failed {
                failure,
                recovered_apps,
            } => Some((
                LineKind::Error,
                format!(
                    "Transaction failed: {} ({recovered_apps} apps recovered)",
                    failure.message
                ),
            )),
            TransactionEvent::FirstErrorCaptured { .. } => None,
            TransactionEvent::EndOfLife {
                reference,
                reason,
                rebased_to,
            } => {
                let line = match (rebased_to, reason) {
                    (Some(new_ref), _) => format!("{reference} is end-of-life, replaced by {new_ref}"),
                    (None, Some(reason)) => format!("{reference} is end-of-life: {reason}"),
                    (None, None) => format!("{reference} is end-of-life"),
                };
                Some((LineKind::Warning, line))
            }
            TransactionEvent::RebaseQueued {
                old_ref, new_ref, ..
            } => Some((
                LineKind::Status,
                format!("Queued rebase of {old_ref} to {new_ref}"),
            )),
            TransactionEvent::RebaseSkipped { old_ref, .. } => {
                self.debug_line(format!("Not rebasing {old_ref}: not installed"))
            }
            TransactionEvent::UnresolvedRef { reference } => Some((
                LineKind::Warning,
                format!("Warning: no app known for {reference}"),
            )),
        }
    }

    fn render_lifecycle(&self, event: &LifecycleEvent) -> Option<(LineKind, String)> {
        match event {
            LifecycleEvent::OperationStarted { reference, kind } => {
                Some((LineKind::Status, format!("{} {reference}", verb(*kind))))
            }
            LifecycleEvent::OperationCompleted {
                reference,
                changed,
                ..
            } => Some((
                LineKind::Status,
                if *changed {
                    format!("Done {reference}")
                } else {
                    format!("Done {reference} (no change)")
                },
            )),
            LifecycleEvent::OperationSkipped {
                reference, message, ..
            } => self.debug_line(format!("Skipped {reference}: {message}")),
            LifecycleEvent::OperationFailed {
                reference,
                kind,
                fatal,
                failure,
            } => {
                let line = format!("Failed to {kind} {reference}: {}", failure.message);
                if *fatal {
                    Some((LineKind::Error, line))
                } else {
                    Some((LineKind::Warning, line))
                }
            }
            LifecycleEvent::OperationCancelled { reference, .. } => {
                Some((LineKind::Warning, format!("Cancelled {reference}")))
            }
            LifecycleEvent::StateChanged {
                reference,
                from,
                to,
            } => self.debug_line(format!("{reference}: {from} -> {to}")),
            LifecycleEvent::StateChangeRejected {
                reference,
                from,
                to,
            } => Some((
                LineKind::Warning,
                format!("Warning: {reference} cannot go from {from} to {to}"),
            )),
            LifecycleEvent::StateRecovered {
                reference,
                from,
                to,
            } => Some((
                LineKind::Status,
                format!("Restored {reference}: {from} -> {to}"),
            )),
            LifecycleEvent::SkippedDependencyInstalled { reference } => {
                self.debug_line(format!("{reference} already installed"))
            }
        }
    }

    fn debug_line(&self, line: String) -> Option<(LineKind, String)> {
        self.debug_enabled.then_some((LineKind::Debug, line))
    }
}

fn verb(kind: txflow_types::OperationKind) -> &'static str {
    use txflow_types::OperationKind;
    match kind {
        OperationKind::Install | OperationKind::InstallBundle => "Installing",
        OperationKind::Update => "Updating",
        OperationKind::Uninstall => "Uninstalling",
    }
}
