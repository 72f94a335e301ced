//! Command results handed to the output renderer

use serde::Serialize;
use txflow_errors::Error;
use txflow_events::FailureContext;
use txflow_transaction::sim::{Outcome, PlanGraph, PlannedRunner};
use txflow_transaction::{related_download_size, ErrorOperation, OperationGraph};
use txflow_types::{AppHandle, AppState, OperationKind, Progress};

/// Result of a CLI command
#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum CommandResult {
    Run(RunReport),
    Inspect(InspectReport),
}

impl CommandResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// The error that should make the process exit non-zero
    pub fn into_failure(self) -> Option<Error> {
        match self {
            Self::Run(report) => report.failure,
            Self::Inspect(_) => None,
        }
    }
}

/// Final state of one app after a run
#[derive(Debug, Serialize)]
pub struct AppRow {
    pub reference: String,
    pub state: AppState,
    pub progress: Progress,
    pub version: Option<String>,
}

impl AppRow {
    pub fn from_app(app: &AppHandle) -> Self {
        Self {
            reference: app.reference().to_string(),
            state: app.state(),
            progress: app.progress(),
            version: app.version(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RebaseRow {
    pub old_ref: String,
    pub new_ref: String,
    pub remote: String,
}

#[derive(Debug, Serialize)]
pub struct FailedOperationRow {
    pub reference: String,
    pub kind: OperationKind,
    pub app_state: Option<AppState>,
}

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub success: bool,
    pub operations: usize,
    pub apps: Vec<AppRow>,
    pub rebases: Vec<RebaseRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_operation: Option<FailedOperationRow>,
    #[serde(skip)]
    pub failure: Option<Error>,
}

impl RunReport {
    pub fn new(
        runner: &PlannedRunner,
        apps: &[AppHandle],
        outcome: Result<(), Error>,
        error_operation: Option<ErrorOperation>,
    ) -> Self {
        let failure = outcome.err();
        Self {
            success: failure.is_none(),
            operations: runner.plan_graph().operations().len(),
            apps: apps.iter().map(AppRow::from_app).collect(),
            rebases: runner
                .rebases()
                .iter()
                .map(|rebase| RebaseRow {
                    old_ref: rebase.old_ref.clone(),
                    new_ref: rebase.new_ref.clone(),
                    remote: rebase.remote.clone(),
                })
                .collect(),
            error: failure.as_ref().map(FailureContext::from_error),
            failed_operation: error_operation.map(|failed| FailedOperationRow {
                reference: failed.operation.reference,
                kind: failed.operation.kind,
                app_state: failed.app.map(|app| app.state()),
            }),
            failure,
        }
    }
}

/// One planned operation as shown by `inspect`
#[derive(Debug, Serialize)]
pub struct OperationRow {
    pub index: usize,
    pub reference: String,
    pub kind: OperationKind,
    pub download_size: u64,
    pub related_download_size: u64,
    pub skipped: bool,
    pub related_to: Vec<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub operations: Vec<OperationRow>,
    pub total_download_size: u64,
}

impl InspectReport {
    pub fn from_graph(graph: &PlanGraph) -> Self {
        let operations: Vec<OperationRow> = graph
            .all_operations()
            .map(|op| OperationRow {
                index: op.index(),
                reference: graph.reference(op).to_string(),
                kind: graph.kind(op),
                download_size: graph.download_size(op),
                related_download_size: related_download_size(graph, op),
                skipped: graph.is_skipped(op),
                related_to: graph
                    .related_to(op)
                    .into_iter()
                    .map(|related| graph.reference(related).to_string())
                    .collect(),
                outcome: graph.outcome(op),
            })
            .collect();
        let total_download_size = operations
            .iter()
            .filter(|row| !row.skipped)
            .fold(0u64, |total, row| total.saturating_add(row.download_size));
        Self {
            operations,
            total_download_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txflow_transaction::sim::Plan;

    const PLAN: &str = r#"
[[operations]]
reference = "runtime/org.example.Platform/x86_64/1"
kind = "install"
download_size = 300
related_to = ["app/org.example.App/x86_64/stable"]

[[operations]]
reference = "app/org.example.Skipped/x86_64/stable"
kind = "install"
download_size = 50
skipped = true

[[operations]]
reference = "app/org.example.App/x86_64/stable"
kind = "install"
download_size = 200
"#;

    #[test]
    fn test_inspect_lists_every_operation() {
        let runner = Plan::from_toml(PLAN).unwrap().into_runner().unwrap();
        let report = InspectReport::from_graph(runner.plan_graph());

        assert_eq!(report.operations.len(), 3);
        assert!(report.operations[1].skipped);
        assert_eq!(
            report.operations[0].related_to,
            vec!["app/org.example.App/x86_64/stable".to_string()]
        );
        assert_eq!(report.operations[2].related_download_size, 500);
        assert_eq!(report.total_download_size, 500);
    }

    #[test]
    fn test_failed_run_keeps_error_out_of_json() {
        let runner = Plan::default().into_runner().unwrap();
        let failure = Error::internal("boom");
        let report = RunReport::new(&runner, &[], Err(failure), None);
        assert!(!report.success);

        let json = CommandResult::Run(report).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["command"], "run");
        assert_eq!(value["error"]["code"], "error.internal");
        assert!(value.get("failure").is_none());
    }
}
