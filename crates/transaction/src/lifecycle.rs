//! Engine callbacks: driving app states from runner notifications

use std::collections::HashMap;

use crate::graph::PlanView;
use crate::operation::{EndOfLife, OperationGraph, OperationId, OperationResult, ProgressReport};
use crate::progress::{monotonic_update, weighted_percent, ProgressUpdate};
use crate::resolver::RefCache;
use crate::runner::{PlanEditor, TransactionHandler};
use crate::session::TransactionOptions;
use txflow_errors::{Error, TransactionError, UserFacingError};
use txflow_events::{
    AppEvent, EventEmitter, EventMeta, EventSender, FailureContext, GeneralEvent, LifecycleEvent,
    ProgressEvent, TransactionEvent,
};
use txflow_types::{App, AppHandle, AppState, OperationKind, Progress};
use uuid::Uuid;

/// The operation that produced a session's first fatal error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOperation {
    pub id: OperationId,
    pub reference: String,
    pub kind: OperationKind,
}

/// Per-session engine state, driven by the runner through [`TransactionHandler`]
pub(crate) struct Engine {
    options: TransactionOptions,
    pub(crate) cache: RefCache,
    /// op -> app association, filled in lazily and kept for the session
    attached: HashMap<OperationId, AppHandle>,
    first_error: Option<Error>,
    error_operation: Option<FailedOperation>,
    event_sender: Option<EventSender>,
    /// id of the run's `Started` event, the parent of everything after it
    run_event: Option<Uuid>,
}

impl EventEmitter for Engine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    fn emit(&self, event: AppEvent) {
        if self.event_sender.is_none() {
            return;
        }
        let meta = EventMeta::for_event(&event);
        let meta = match self.run_event {
            Some(parent) => meta.with_parent(parent),
            None => meta,
        };
        self.emit_with_meta(meta, event);
    }
}

impl Engine {
    pub(crate) fn new(options: TransactionOptions, cache: RefCache) -> Self {
        Self {
            options,
            cache,
            attached: HashMap::new(),
            first_error: None,
            error_operation: None,
            event_sender: None,
            run_event: None,
        }
    }

    pub(crate) fn set_event_sender(&mut self, sender: EventSender) {
        self.event_sender = Some(sender);
    }

    /// Emit the event that opens a run; later events name it as their parent.
    pub(crate) fn begin_run(&mut self, event: AppEvent) {
        let meta = EventMeta::for_event(&event);
        self.run_event = Some(meta.event_id);
        self.emit_with_meta(meta, event);
    }

    pub(crate) fn options(&self) -> TransactionOptions {
        self.options
    }

    pub(crate) fn first_error(&self) -> Option<&Error> {
        self.first_error.as_ref()
    }

    pub(crate) fn error_operation(&self) -> Option<&FailedOperation> {
        self.error_operation.as_ref()
    }

    pub(crate) fn attached_app(&self, op: OperationId) -> Option<AppHandle> {
        self.attached.get(&op).cloned()
    }

    /// The app for `op`, resolving and attaching it on first use.
    pub(crate) fn app_for(&mut self, graph: &dyn OperationGraph, op: OperationId) -> Option<AppHandle> {
        if let Some(app) = self.attached.get(&op) {
            return Some(app.clone());
        }
        let app = self.cache.resolve(graph.reference(op))?;
        self.attached.insert(op, app.clone());
        Some(app)
    }

    fn app_or_report(&mut self, graph: &dyn OperationGraph, op: OperationId) -> Option<AppHandle> {
        let app = self.app_for(graph, op);
        if app.is_none() {
            self.emit(AppEvent::Transaction(TransactionEvent::UnresolvedRef {
                reference: graph.reference(op).to_string(),
            }));
        }
        app
    }

    /// Request a state change, reporting rejected transitions.
    fn transition(&self, app: &App, to: AppState) -> bool {
        let from = app.state();
        match app.set_state(to) {
            Ok(true) => {
                self.emit(AppEvent::Lifecycle(LifecycleEvent::StateChanged {
                    reference: app.reference().to_string(),
                    from,
                    to,
                }));
                true
            }
            Ok(false) => false,
            Err(_) => {
                self.emit(AppEvent::Lifecycle(LifecycleEvent::StateChangeRejected {
                    reference: app.reference().to_string(),
                    from,
                    to,
                }));
                false
            }
        }
    }

    /// Put `app` back into a state from which the operation can be retried.
    pub(crate) fn recover(&self, app: &App) -> bool {
        if let Some((from, to)) = app.set_state_recover() {
            self.emit(AppEvent::Lifecycle(LifecycleEvent::StateRecovered {
                reference: app.reference().to_string(),
                from,
                to,
            }));
            return true;
        }

        // no stable state was ever recorded; never leave it mid-operation
        let from = app.state();
        if from.is_transient() && matches!(app.set_state(AppState::Unknown), Ok(true)) {
            app.set_progress(Progress::Percent(0));
            self.emit(AppEvent::Lifecycle(LifecycleEvent::StateRecovered {
                reference: app.reference().to_string(),
                from,
                to: AppState::Unknown,
            }));
            return true;
        }
        false
    }

    /// Recover the app of every planned operation, returning how many changed.
    pub(crate) fn recover_all(&mut self, graph: &dyn OperationGraph) -> usize {
        let mut recovered = 0;
        for op in graph.operations() {
            if let Some(app) = self.app_for(graph, op) {
                if self.recover(&app) {
                    recovered += 1;
                }
            }
        }
        recovered
    }

    /// Apply one aggregation root; returns whether to walk on past it.
    fn update_root(
        &mut self,
        view: &PlanView<'_>,
        current: OperationId,
        root: OperationId,
        transferred: u64,
    ) -> bool {
        let graph = view.graph();
        let Some(app) = self.app_or_report(graph, root) else {
            return false;
        };
        // a skipped root that is not being worked on is outside this session
        if graph.is_skipped(root) && !app.state().is_active() {
            return false;
        }

        let bytes = view.related_bytes(current, root);
        let percent = weighted_percent(bytes.prior, transferred, bytes.total);
        match monotonic_update(app.progress(), percent) {
            ProgressUpdate::Written(percent) => {
                if app.set_progress(Progress::Percent(percent)) {
                    self.emit(AppEvent::Progress(ProgressEvent::Changed {
                        reference: app.reference().to_string(),
                        percent,
                    }));
                }
            }
            ProgressUpdate::Unchanged => {}
            ProgressUpdate::Discarded { current, computed } => {
                self.emit(AppEvent::Progress(ProgressEvent::Discarded {
                    reference: app.reference().to_string(),
                    current,
                    computed,
                }));
            }
        }
        true
    }

    /// Move `app` into the busy state of `kind`, first giving an app with no
    /// known state the stable state that kind starts from.
    fn enter_active_state(&self, app: &App, kind: OperationKind) {
        match kind {
            OperationKind::Install => {
                if app.state() == AppState::Unknown {
                    self.transition(app, AppState::Available);
                }
            }
            OperationKind::InstallBundle => {
                if app.state() == AppState::Unknown {
                    self.transition(app, AppState::AvailableLocal);
                }
            }
            OperationKind::Update => {
                if matches!(app.state(), AppState::Unknown | AppState::Installed) {
                    self.transition(app, AppState::UpdatableLive);
                }
            }
            OperationKind::Uninstall => {}
        }
        self.transition(app, kind.active_state());
    }

    /// Mark skipped operations related to `op` as installed once nothing
    /// later in the plan still depends on them.
    fn promote_skipped_related(&mut self, graph: &dyn OperationGraph, op: OperationId) {
        let view = PlanView::new(graph);
        for related in graph.related_to(op) {
            if !graph.is_skipped(related) || view.later_op_also_related(op, related) {
                continue;
            }
            let Some(app) = self.app_for(graph, related) else {
                continue;
            };
            // never driven by its own operation, so pass through the busy state first
            let kind = graph.kind(related);
            if kind.is_install_kind()
                && app.state() != AppState::Installed
                && !app.state().is_active()
            {
                self.enter_active_state(&app, kind);
            }
            if self.transition(&app, AppState::Installed) {
                self.emit(AppEvent::Lifecycle(LifecycleEvent::SkippedDependencyInstalled {
                    reference: app.reference().to_string(),
                }));
            }
        }
    }

    fn capture_first_error(&mut self, graph: &dyn OperationGraph, op: OperationId, error: &Error) {
        if self.first_error.is_some() {
            return;
        }
        self.first_error = Some(error.clone());
        self.error_operation = Some(FailedOperation {
            id: op,
            reference: graph.reference(op).to_string(),
            kind: graph.kind(op),
        });
        self.emit(AppEvent::Transaction(TransactionEvent::FirstErrorCaptured {
            reference: graph.reference(op).to_string(),
            failure: FailureContext::from_error(error),
        }));
    }
}

impl TransactionHandler for Engine {
    fn on_ready(&mut self, graph: &dyn OperationGraph) -> bool {
        let operations = graph.operations();
        let mut apps = 0;
        for &op in &operations {
            let Some(app) = self.app_for(graph, op) else {
                continue;
            };
            apps += 1;
            // flag every app an update touches so its state is visibly busy
            if graph.kind(op) == OperationKind::Update {
                self.enter_active_state(&app, OperationKind::Update);
            }
        }
        self.emit(AppEvent::Transaction(TransactionEvent::Ready {
            operations: operations.len(),
            apps,
        }));
        true
    }

    fn on_new_operation(&mut self, graph: &dyn OperationGraph, op: OperationId) {
        let kind = graph.kind(op);
        self.emit(AppEvent::Lifecycle(LifecycleEvent::OperationStarted {
            reference: graph.reference(op).to_string(),
            kind,
        }));
        let Some(app) = self.app_or_report(graph, op) else {
            return;
        };
        self.enter_active_state(&app, kind);
    }

    fn on_progress(&mut self, graph: &dyn OperationGraph, op: OperationId, report: ProgressReport) {
        if report.is_estimating {
            if let Some(app) = self.app_or_report(graph, op) {
                if app.set_progress(Progress::Unknown) {
                    self.emit(AppEvent::Progress(ProgressEvent::Unknown {
                        reference: app.reference().to_string(),
                    }));
                }
            }
            return;
        }

        let view = PlanView::new(graph);
        view.walk_up(op, |root| {
            self.update_root(&view, op, root, report.bytes_transferred)
        });
    }

    fn on_operation_done(
        &mut self,
        graph: &dyn OperationGraph,
        op: OperationId,
        result: OperationResult,
    ) {
        let kind = graph.kind(op);
        self.emit(AppEvent::Lifecycle(LifecycleEvent::OperationCompleted {
            reference: graph.reference(op).to_string(),
            kind,
            changed: result == OperationResult::Changed,
        }));
        let Some(app) = self.app_or_report(graph, op) else {
            return;
        };

        match kind {
            OperationKind::Install | OperationKind::InstallBundle => {
                self.transition(&app, AppState::Installed);
                self.promote_skipped_related(graph, op);
            }
            OperationKind::Update => {
                if let Some(version) = app.update_version() {
                    app.set_version(Some(version));
                }
                app.set_update_version(None);
                app.set_update_details(None);
                let target = if self.options.no_deploy {
                    // pulled but not deployed
                    AppState::UpdatableLive
                } else {
                    AppState::Installed
                };
                self.transition(&app, target);
                self.promote_skipped_related(graph, op);
            }
            OperationKind::Uninstall => {
                // whether it can be reinstalled is unknown from here
                app.set_commit(None);
                self.transition(&app, AppState::Unknown);
            }
        }
    }

    fn on_operation_error(
        &mut self,
        graph: &dyn OperationGraph,
        op: OperationId,
        error: &Error,
        non_fatal: bool,
    ) -> bool {
        let reference = graph.reference(op).to_string();
        let kind = graph.kind(op);
        if let Some(app) = self.app_for(graph, op) {
            self.recover(&app);
        }

        if error.is_skip() {
            let message = match error {
                Error::Transaction(TransactionError::Skipped { message, .. }) => message.clone(),
                other => other.to_string(),
            };
            self.emit(AppEvent::Lifecycle(LifecycleEvent::OperationSkipped {
                reference,
                kind,
                message,
            }));
            return true;
        }

        if error.is_cancelled() {
            self.emit(AppEvent::Lifecycle(LifecycleEvent::OperationCancelled { reference, kind }));
            return false;
        }

        self.emit(AppEvent::Lifecycle(LifecycleEvent::OperationFailed {
            reference,
            kind,
            fatal: !non_fatal,
            failure: FailureContext::from_error(error),
        }));
        if non_fatal {
            return true;
        }

        self.capture_first_error(graph, op, error);
        !self.options.stop_on_first_error
    }

    fn on_end_of_lifed(
        &mut self,
        graph: &dyn OperationGraph,
        editor: &mut dyn PlanEditor,
        op: OperationId,
        notice: &EndOfLife,
    ) -> bool {
        let old_ref = graph.reference(op).to_string();
        self.emit(AppEvent::Transaction(TransactionEvent::EndOfLife {
            reference: old_ref.clone(),
            reason: notice.reason.clone(),
            rebased_to: notice.rebased_to.clone(),
        }));
        let Some(new_ref) = notice.rebased_to.as_deref() else {
            return false;
        };

        match editor.add_rebase_and_uninstall(&notice.remote, new_ref, &old_ref) {
            Ok(()) => {
                self.emit(AppEvent::Transaction(TransactionEvent::RebaseQueued {
                    old_ref,
                    new_ref: new_ref.to_string(),
                    remote: notice.remote.clone(),
                }));
                true
            }
            // expected when the rebase happens on first install
            Err(err) if err.is_not_installed() => {
                self.emit(AppEvent::Transaction(TransactionEvent::RebaseSkipped {
                    old_ref,
                    new_ref: new_ref.to_string(),
                }));
                false
            }
            Err(err) => {
                let failure = TransactionError::RebaseFailed {
                    old_ref,
                    new_ref: new_ref.to_string(),
                    message: err.user_message().into_owned(),
                };
                self.emit(AppEvent::General(GeneralEvent::warning_with_context(
                    failure.to_string(),
                    err.user_code().unwrap_or("error.unknown"),
                )));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::FakeGraph;
    use txflow_events::channel;

    fn engine(options: TransactionOptions, apps: &[&AppHandle]) -> Engine {
        let mut cache = RefCache::default();
        for app in apps {
            cache.insert((*app).clone());
        }
        Engine::new(options, cache)
    }

    fn id(index: usize) -> OperationId {
        OperationId::new(index)
    }

    #[test]
    fn install_goes_through_available_to_installing() {
        let app = App::new("app").into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Install, 10);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        engine.on_new_operation(&graph, id(0));
        assert_eq!(app.state(), AppState::Installing);
        assert_eq!(app.state_recover(), AppState::Available);

        engine.on_operation_done(&graph, id(0), OperationResult::Changed);
        assert_eq!(app.state(), AppState::Installed);
    }

    #[test]
    fn bundle_install_starts_from_available_local() {
        let app = App::new("bundle").into_handle();
        let graph = FakeGraph::default().op("bundle", OperationKind::InstallBundle, 10);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        engine.on_new_operation(&graph, id(0));
        assert_eq!(app.state_recover(), AppState::AvailableLocal);
        assert_eq!(app.state(), AppState::Installing);
    }

    #[test]
    fn update_completion_moves_version_forward() {
        let app = App::new("app")
            .with_state(AppState::Installed)
            .with_version("1.0")
            .with_update_version("1.1")
            .into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Update, 10);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        assert!(engine.on_ready(&graph));
        assert_eq!(app.state(), AppState::Installing);
        engine.on_new_operation(&graph, id(0));
        engine.on_operation_done(&graph, id(0), OperationResult::Changed);

        assert_eq!(app.state(), AppState::Installed);
        assert_eq!(app.version().as_deref(), Some("1.1"));
        assert_eq!(app.update_version(), None);
    }

    #[test]
    fn update_without_deploy_stays_live_updatable() {
        let app = App::new("app").with_state(AppState::Installed).into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Update, 10);
        let options = TransactionOptions {
            no_deploy: true,
            ..TransactionOptions::default()
        };
        let mut engine = engine(options, &[&app]);

        engine.on_new_operation(&graph, id(0));
        engine.on_operation_done(&graph, id(0), OperationResult::Changed);
        assert_eq!(app.state(), AppState::UpdatableLive);
    }

    #[test]
    fn uninstall_forgets_commit() {
        let app = App::new("app")
            .with_state(AppState::Installed)
            .with_commit("abc123")
            .into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Uninstall, 0);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        engine.on_new_operation(&graph, id(0));
        assert_eq!(app.state(), AppState::Removing);
        engine.on_operation_done(&graph, id(0), OperationResult::Changed);
        assert_eq!(app.state(), AppState::Unknown);
        assert_eq!(app.commit(), None);
    }

    #[test]
    fn estimating_sets_unknown_progress() {
        let app = App::new("app").into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Install, 10);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        engine.on_progress(&graph, id(0), ProgressReport::estimating());
        assert_eq!(app.progress(), Progress::Unknown);
        engine.on_progress(&graph, id(0), ProgressReport::bytes(5));
        assert_eq!(app.progress(), Progress::Percent(50));
    }

    #[test]
    fn skipped_root_is_ignored_unless_active() {
        let runtime = App::new("runtime").into_handle();
        let app = App::new("app").with_state(AppState::Installed).into_handle();
        // runtime is related to an already-installed, skipped app
        let graph = FakeGraph::default()
            .op("runtime", OperationKind::Install, 100)
            .op("app", OperationKind::Install, 0)
            .skipped(1)
            .edge(0, 1);
        let mut engine = engine(TransactionOptions::default(), &[&runtime, &app]);

        engine.on_progress(&graph, id(0), ProgressReport::bytes(50));
        assert_eq!(runtime.progress(), Progress::Percent(50));
        assert_eq!(app.progress(), Progress::Percent(0));
    }

    #[test]
    fn walk_stops_at_inactive_skipped_root() {
        let leaf = App::new("leaf").into_handle();
        let middle = App::new("middle").with_state(AppState::Installed).into_handle();
        let top = App::new("top").into_handle();
        // top is only reachable through the skipped middle
        let graph = FakeGraph::default()
            .op("leaf", OperationKind::Install, 100)
            .op("middle", OperationKind::Install, 100)
            .op("top", OperationKind::Install, 100)
            .skipped(1)
            .edge(0, 1)
            .edge(1, 2);
        let mut engine = engine(TransactionOptions::default(), &[&leaf, &middle, &top]);

        engine.on_progress(&graph, id(0), ProgressReport::bytes(50));

        assert_eq!(leaf.progress(), Progress::Percent(50));
        assert_eq!(middle.progress(), Progress::Percent(0));
        assert_eq!(top.progress(), Progress::Percent(0));
    }

    #[test]
    fn skipped_dependency_passes_through_installing() {
        let runtime = App::new("runtime").into_handle();
        let locale = App::new("locale")
            .with_state(AppState::UpdatableLive)
            .into_handle();
        let extension = App::new("extension")
            .with_state(AppState::Available)
            .into_handle();
        let graph = FakeGraph::default()
            .op("locale", OperationKind::Update, 10)
            .op("extension", OperationKind::Install, 10)
            .op("runtime", OperationKind::Install, 100)
            .skipped(0)
            .skipped(1)
            .edge(2, 0)
            .edge(2, 1);
        let (tx, mut rx) = channel();
        let mut engine = engine(
            TransactionOptions::default(),
            &[&runtime, &locale, &extension],
        );
        engine.set_event_sender(tx);

        assert!(engine.on_ready(&graph));
        engine.on_new_operation(&graph, id(2));
        engine.on_operation_done(&graph, id(2), OperationResult::Changed);

        assert_eq!(locale.state(), AppState::Installed);
        assert_eq!(extension.state(), AppState::Installed);

        let mut locale_path = Vec::new();
        while let Ok(message) = rx.try_recv() {
            match message.event {
                AppEvent::Lifecycle(LifecycleEvent::StateChanged { reference, to, .. })
                    if reference == "locale" =>
                {
                    locale_path.push(to);
                }
                AppEvent::Lifecycle(LifecycleEvent::StateChangeRejected { reference, .. }) => {
                    panic!("transition rejected for {reference}");
                }
                _ => {}
            }
        }
        assert_eq!(locale_path, vec![AppState::Installing, AppState::Installed]);
    }

    #[test]
    fn unresolved_root_is_reported_and_branch_abandoned() {
        let top = App::new("top").into_handle();
        let graph = FakeGraph::default()
            .op("leaf", OperationKind::Install, 100)
            .op("middle", OperationKind::Install, 100)
            .op("top", OperationKind::Install, 100)
            .edge(0, 1)
            .edge(1, 2);
        let (tx, mut rx) = channel();
        let mut engine = engine(TransactionOptions::default(), &[&top]);
        engine.set_event_sender(tx);

        engine.on_progress(&graph, id(0), ProgressReport::bytes(100));

        assert_eq!(top.progress(), Progress::Percent(0));
        let mut unresolved = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Transaction(TransactionEvent::UnresolvedRef { reference }) =
                message.event
            {
                unresolved.push(reference);
            }
        }
        assert_eq!(unresolved, vec!["leaf".to_string()]);
    }

    #[test]
    fn cancellation_stops_without_first_error() {
        let app = App::new("app").with_state(AppState::Installed).into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Uninstall, 0);
        let mut engine = engine(TransactionOptions::default(), &[&app]);

        engine.on_new_operation(&graph, id(0));
        assert!(!engine.on_operation_error(&graph, id(0), &Error::Cancelled, false));
        assert!(engine.first_error().is_none());
        assert_eq!(app.state(), AppState::Installed);
    }

    #[test]
    fn skip_errors_continue() {
        let app = App::new("app").with_state(AppState::Installed).into_handle();
        let graph = FakeGraph::default().op("app", OperationKind::Update, 0);
        let mut engine = engine(TransactionOptions::default(), &[&app]);
        let skipped: Error = TransactionError::Skipped {
            reference: "app".into(),
            message: "already up to date".into(),
        }
        .into();

        engine.on_new_operation(&graph, id(0));
        assert!(engine.on_operation_error(&graph, id(0), &skipped, false));
        assert!(engine.first_error().is_none());
        assert_eq!(app.state(), AppState::UpdatableLive);
    }

    #[test]
    fn recovery_without_stable_state_forces_unknown() {
        let app = App::new("app").with_state(AppState::Installing).into_handle();
        let engine = engine(TransactionOptions::default(), &[]);

        assert!(engine.recover(&app));
        assert_eq!(app.state(), AppState::Unknown);
        assert!(!engine.recover(&app));
    }

    struct Editor {
        result: Option<Error>,
        queued: Vec<(String, String, String)>,
    }

    impl PlanEditor for Editor {
        fn add_rebase_and_uninstall(
            &mut self,
            remote: &str,
            new_ref: &str,
            old_ref: &str,
        ) -> Result<(), Error> {
            if let Some(err) = self.result.take() {
                return Err(err);
            }
            self.queued
                .push((remote.into(), new_ref.into(), old_ref.into()));
            Ok(())
        }
    }

    fn notice(rebased_to: Option<&str>) -> EndOfLife {
        EndOfLife {
            remote: "flathub".into(),
            reason: Some("renamed".into()),
            rebased_to: rebased_to.map(Into::into),
        }
    }

    #[test]
    fn end_of_life_queues_rebase() {
        let graph = FakeGraph::default().op("app/old", OperationKind::Update, 0);
        let mut engine = engine(TransactionOptions::default(), &[]);
        let mut editor = Editor {
            result: None,
            queued: Vec::new(),
        };

        assert!(engine.on_end_of_lifed(&graph, &mut editor, id(0), &notice(Some("app/new"))));
        assert_eq!(
            editor.queued,
            vec![(
                "flathub".to_string(),
                "app/new".to_string(),
                "app/old".to_string()
            )]
        );
        assert!(!engine.on_end_of_lifed(&graph, &mut editor, id(0), &notice(None)));
    }

    #[test]
    fn end_of_life_swallows_not_installed() {
        let graph = FakeGraph::default().op("app/old", OperationKind::Install, 0);
        let mut engine = engine(TransactionOptions::default(), &[]);
        let mut editor = Editor {
            result: Some(
                TransactionError::NotInstalled {
                    reference: "app/old".into(),
                }
                .into(),
            ),
            queued: Vec::new(),
        };

        assert!(!engine.on_end_of_lifed(&graph, &mut editor, id(0), &notice(Some("app/new"))));
        assert!(engine.first_error().is_none());
    }
}
