//! The seam between the engine and whatever executes operations

use crate::operation::{EndOfLife, OperationGraph, OperationId, OperationResult, ProgressReport};
use txflow_errors::Error;

/// Something that executes a plan and reports back through callbacks.
///
/// Implementations must call the handler from inside [`TransactionRunner::run`],
/// on the calling thread, and report operations in the order
/// [`OperationGraph::operations`] lists them.
pub trait TransactionRunner {
    /// The finalized plan. Must stay valid after `run` returns.
    fn graph(&self) -> &dyn OperationGraph;

    /// Execute the plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the run as a whole failed or was stopped by the
    /// handler. The error is often a generic wrapper around the real cause.
    fn run(&mut self, handler: &mut dyn TransactionHandler) -> Result<(), Error>;
}

/// Callbacks a runner invokes while executing a plan
pub trait TransactionHandler {
    /// The plan is final. Returning `false` aborts before any work starts.
    fn on_ready(&mut self, graph: &dyn OperationGraph) -> bool;

    fn on_new_operation(&mut self, graph: &dyn OperationGraph, op: OperationId);

    fn on_progress(&mut self, graph: &dyn OperationGraph, op: OperationId, report: ProgressReport);

    fn on_operation_done(
        &mut self,
        graph: &dyn OperationGraph,
        op: OperationId,
        result: OperationResult,
    );

    /// Returns whether the runner should carry on with the remaining operations.
    fn on_operation_error(
        &mut self,
        graph: &dyn OperationGraph,
        op: OperationId,
        error: &Error,
        non_fatal: bool,
    ) -> bool;

    /// Returns `true` if a replacement was queued through `editor`.
    fn on_end_of_lifed(
        &mut self,
        graph: &dyn OperationGraph,
        editor: &mut dyn PlanEditor,
        op: OperationId,
        notice: &EndOfLife,
    ) -> bool;
}

/// Mutations a handler may request while the runner is executing
pub trait PlanEditor {
    /// Replace `old_ref` by `new_ref` from `remote` and remove the old one.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::NotInstalled` when `old_ref` is not on disk,
    /// or another error if the rebase cannot be planned.
    fn add_rebase_and_uninstall(
        &mut self,
        remote: &str,
        new_ref: &str,
        old_ref: &str,
    ) -> Result<(), Error>;
}
