//! One transaction session: registration, run, and error reporting

use crate::lifecycle::{Engine, FailedOperation};
use crate::resolver::{NoFallback, RefCache, RefResolver};
use crate::runner::TransactionRunner;
use txflow_config::TransactionConfig;
use txflow_errors::{Error, TransactionError};
use txflow_events::{AppEvent, EventEmitter, EventSender, FailureContext, TransactionEvent};
use txflow_types::AppHandle;

/// Session policy, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Ask the runner to halt after the first fatal operation error
    pub stop_on_first_error: bool,
    /// Updates are pulled but not deployed
    pub no_deploy: bool,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            stop_on_first_error: true,
            no_deploy: false,
        }
    }
}

impl From<&TransactionConfig> for TransactionOptions {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            stop_on_first_error: config.stop_on_first_error,
            no_deploy: config.no_deploy,
        }
    }
}

/// The operation behind a session's first fatal error, with its app if known
#[derive(Debug, Clone)]
pub struct ErrorOperation {
    pub operation: FailedOperation,
    pub app: Option<AppHandle>,
}

/// A transaction session wrapping a runner.
///
/// Apps are shared with the host through [`AppHandle`]s, so a session is
/// confined to the thread that created it.
pub struct Transaction<R> {
    runner: R,
    engine: Engine,
    has_run: bool,
}

impl<R: TransactionRunner> Transaction<R> {
    /// Create a session whose refs must all be registered with [`Transaction::add_app`].
    pub fn new(runner: R, options: TransactionOptions) -> Self {
        Self::with_resolver(runner, options, NoFallback)
    }

    /// Create a session that asks `resolver` about refs nobody registered.
    pub fn with_resolver(
        runner: R,
        options: TransactionOptions,
        resolver: impl RefResolver + 'static,
    ) -> Self {
        Self {
            runner,
            engine: Engine::new(options, RefCache::new(Box::new(resolver))),
            has_run: false,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.engine.set_event_sender(sender);
        self
    }

    #[must_use]
    pub fn options(&self) -> TransactionOptions {
        self.engine.options()
    }

    /// Register an app, and its runtime if it has one.
    pub fn add_app(&mut self, app: &AppHandle) {
        self.engine.cache.insert(app.clone());
        if let Some(runtime) = app.runtime() {
            self.engine.cache.insert(runtime);
        }
    }

    /// Attach `runtime` to `app` and register both.
    pub fn add_app_with_runtime(&mut self, app: &AppHandle, runtime: &AppHandle) {
        app.set_runtime(Some(runtime.clone()));
        self.add_app(app);
    }

    /// Look up a registered (or already resolved) app without consulting the resolver.
    #[must_use]
    pub fn app_by_ref(&self, reference: &str) -> Option<AppHandle> {
        self.engine.cache.get(reference)
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run the transaction once.
    ///
    /// On failure every planned operation's app is put back into a state
    /// from which it can be retried, and the first fatal operation error is
    /// returned in preference to the runner's own error.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::AlreadyRun` on a second call, the first
    /// fatal operation error if one was captured, or the runner's error.
    pub fn run(&mut self) -> Result<(), Error> {
        if self.has_run {
            return Err(TransactionError::AlreadyRun.into());
        }
        self.has_run = true;

        let options = self.engine.options();
        self.engine
            .begin_run(AppEvent::Transaction(TransactionEvent::Started {
                stop_on_first_error: options.stop_on_first_error,
                no_deploy: options.no_deploy,
            }));

        let outcome = self.runner.run(&mut self.engine);
        let failure = match (outcome, self.engine.first_error().cloned()) {
            (Ok(()), None) => {
                let operations = self.runner.graph().operations().len();
                self.engine
                    .emit(AppEvent::Transaction(TransactionEvent::Completed { operations }));
                return Ok(());
            }
            // the runner kept going past a fatal error and still reported success
            (Ok(()), Some(first)) => first,
            (Err(runner_error), first) => first.unwrap_or(runner_error),
        };

        let recovered_apps = self.engine.recover_all(self.runner.graph());
        self.engine
            .emit(AppEvent::Transaction(TransactionEvent::Failed {
                failure: FailureContext::from_error(&failure),
                recovered_apps,
            }));
        Err(failure)
    }

    /// The first fatal operation error of the run, if any
    #[must_use]
    pub fn first_error(&self) -> Option<&Error> {
        self.engine.first_error()
    }

    /// The operation that caused [`Transaction::first_error`], with its app
    #[must_use]
    pub fn error_operation(&self) -> Option<ErrorOperation> {
        let operation = self.engine.error_operation()?.clone();
        let app = self
            .engine
            .attached_app(operation.id)
            .or_else(|| self.engine.cache.get(&operation.reference));
        Some(ErrorOperation { operation, app })
    }
}
