//! A scripted runner driven by a TOML plan
//!
//! Plans describe the apps a host knows about and the operations a runner
//! would execute, each with a scripted outcome. Running one replays the
//! callbacks a real runner makes, in plan order:
//!
//! ```toml
//! [[apps]]
//! reference = "app/org.example.App/x86_64/stable"
//! state = "available"
//!
//! [[operations]]
//! reference = "app/org.example.App/x86_64/stable"
//! kind = "install"
//! download_size = 500
//! related_to = ["runtime/org.example.Platform/x86_64/1"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::operation::{
    EndOfLife, OperationGraph, OperationId, OperationResult, ProgressReport,
};
use crate::runner::{PlanEditor, TransactionHandler, TransactionRunner};
use txflow_errors::{Error, TransactionError};
use txflow_types::{App, AppHandle, AppState, OperationKind};

/// A complete scripted transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub apps: Vec<PlannedApp>,
    #[serde(default)]
    pub operations: Vec<PlannedOperation>,
}

/// An app the host registers before running
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedApp {
    pub reference: String,
    #[serde(default)]
    pub state: AppState,
    pub version: Option<String>,
    pub update_version: Option<String>,
    /// Ref of another planned app this one runs on
    pub runtime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedOperation {
    pub reference: String,
    /// Parsed when the runner is built so unknown kinds are rejected up front
    pub kind: String,
    #[serde(default)]
    pub download_size: u64,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub related_to: Vec<String>,
    #[serde(default)]
    pub outcome: Outcome,
    pub message: Option<String>,
    #[serde(default = "default_progress_steps")]
    pub progress_steps: u32,
    pub end_of_life: Option<PlannedEndOfLife>,
}

/// What the runner does with an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Success,
    NoChange,
    Fail,
    Skip,
    NonFatal,
    Cancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedEndOfLife {
    pub reason: Option<String>,
    pub rebased_to: Option<String>,
    #[serde(default = "default_remote")]
    pub remote: String,
    /// Whether the old ref is on disk; rebasing it fails with not-installed otherwise
    #[serde(default = "default_installed")]
    pub installed: bool,
}

fn default_progress_steps() -> u32 {
    4
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_installed() -> bool {
    true
}

fn invalid(message: impl Into<String>) -> Error {
    TransactionError::InvalidPlan {
        message: message.into(),
    }
    .into()
}

impl Plan {
    /// Parse a plan from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidPlan` if the text is not a valid plan.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|e| invalid(e.to_string()))
    }

    /// Load a plan file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or
    /// `TransactionError::InvalidPlan` if it cannot be parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;
        Self::from_toml(&contents)
    }

    /// Create the host-side apps, wiring runtimes by ref.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidPlan` for duplicate refs or a
    /// runtime that is not itself a planned app.
    pub fn build_apps(&self) -> Result<Vec<AppHandle>, Error> {
        let mut by_ref: HashMap<&str, AppHandle> = HashMap::new();
        for planned in &self.apps {
            let mut app = App::new(planned.reference.as_str()).with_state(planned.state);
            if let Some(version) = &planned.version {
                app = app.with_version(version.as_str());
            }
            if let Some(version) = &planned.update_version {
                app = app.with_update_version(version.as_str());
            }
            if by_ref
                .insert(planned.reference.as_str(), app.into_handle())
                .is_some()
            {
                return Err(invalid(format!("duplicate app {}", planned.reference)));
            }
        }

        let mut apps = Vec::with_capacity(self.apps.len());
        for planned in &self.apps {
            let Some(app) = by_ref.get(planned.reference.as_str()) else {
                continue;
            };
            if let Some(runtime_ref) = &planned.runtime {
                let runtime = by_ref.get(runtime_ref.as_str()).ok_or_else(|| {
                    invalid(format!(
                        "{} runs on {runtime_ref}, which is not a planned app",
                        planned.reference
                    ))
                })?;
                app.set_runtime(Some(runtime.clone()));
            }
            apps.push(app.clone());
        }
        Ok(apps)
    }

    /// Validate the operations and build a runner for them.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::UnknownOperationKind` for an unsupported
    /// kind, or `TransactionError::InvalidPlan` for duplicate operations and
    /// related-to refs that name no operation.
    pub fn into_runner(self) -> Result<PlannedRunner, Error> {
        let mut ids = HashMap::new();
        for (index, planned) in self.operations.iter().enumerate() {
            if ids
                .insert(planned.reference.clone(), OperationId::new(index))
                .is_some()
            {
                return Err(invalid(format!("duplicate operation {}", planned.reference)));
            }
        }

        let mut operations = Vec::with_capacity(self.operations.len());
        let mut not_installed = HashSet::new();
        for planned in self.operations {
            let kind: OperationKind = planned.kind.parse()?;
            let related_to = planned
                .related_to
                .iter()
                .map(|reference| {
                    ids.get(reference).copied().ok_or_else(|| {
                        invalid(format!(
                            "{} is related to unknown operation {reference}",
                            planned.reference
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if planned.end_of_life.as_ref().is_some_and(|eol| !eol.installed) {
                not_installed.insert(planned.reference.clone());
            }
            operations.push(ScriptedOperation {
                reference: planned.reference,
                kind,
                download_size: planned.download_size,
                skipped: planned.skipped,
                related_to,
                outcome: planned.outcome,
                message: planned.message,
                progress_steps: planned.progress_steps,
                end_of_life: planned.end_of_life.map(|eol| EndOfLife {
                    remote: eol.remote,
                    reason: eol.reason,
                    rebased_to: eol.rebased_to,
                }),
            });
        }

        Ok(PlannedRunner {
            graph: PlanGraph { operations },
            rebases: RebaseQueue {
                not_installed,
                queued: Vec::new(),
            },
        })
    }
}

#[derive(Debug, Clone)]
struct ScriptedOperation {
    reference: String,
    kind: OperationKind,
    download_size: u64,
    skipped: bool,
    related_to: Vec<OperationId>,
    outcome: Outcome,
    message: Option<String>,
    progress_steps: u32,
    end_of_life: Option<EndOfLife>,
}

/// The finalized operation list of a scripted plan
#[derive(Debug, Clone)]
pub struct PlanGraph {
    operations: Vec<ScriptedOperation>,
}

impl PlanGraph {
    fn get(&self, op: OperationId) -> &ScriptedOperation {
        &self.operations[op.index()]
    }

    /// Every operation, skipped ones included, in plan order
    pub fn all_operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        (0..self.operations.len()).map(OperationId::new)
    }

    #[must_use]
    pub fn outcome(&self, op: OperationId) -> Outcome {
        self.get(op).outcome
    }
}

impl OperationGraph for PlanGraph {
    fn operations(&self) -> Vec<OperationId> {
        self.all_operations()
            .filter(|op| !self.get(*op).skipped)
            .collect()
    }

    fn related_to(&self, op: OperationId) -> Vec<OperationId> {
        self.get(op).related_to.clone()
    }

    fn is_skipped(&self, op: OperationId) -> bool {
        self.get(op).skipped
    }

    fn download_size(&self, op: OperationId) -> u64 {
        self.get(op).download_size
    }

    fn reference(&self, op: OperationId) -> &str {
        &self.get(op).reference
    }

    fn kind(&self, op: OperationId) -> OperationKind {
        self.get(op).kind
    }
}

/// A rebase-and-uninstall requested during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rebase {
    pub remote: String,
    pub new_ref: String,
    pub old_ref: String,
}

#[derive(Debug, Default)]
struct RebaseQueue {
    not_installed: HashSet<String>,
    queued: Vec<Rebase>,
}

impl PlanEditor for RebaseQueue {
    fn add_rebase_and_uninstall(
        &mut self,
        remote: &str,
        new_ref: &str,
        old_ref: &str,
    ) -> Result<(), Error> {
        if self.not_installed.contains(old_ref) {
            return Err(TransactionError::NotInstalled {
                reference: old_ref.to_string(),
            }
            .into());
        }
        self.queued.push(Rebase {
            remote: remote.to_string(),
            new_ref: new_ref.to_string(),
            old_ref: old_ref.to_string(),
        });
        Ok(())
    }
}

/// Runner that replays a [`Plan`]
#[derive(Debug)]
pub struct PlannedRunner {
    graph: PlanGraph,
    rebases: RebaseQueue,
}

impl PlannedRunner {
    #[must_use]
    pub fn plan_graph(&self) -> &PlanGraph {
        &self.graph
    }

    /// Rebases the handler queued during the run
    #[must_use]
    pub fn rebases(&self) -> &[Rebase] {
        &self.rebases.queued
    }

    fn report_bytes(
        &self,
        handler: &mut dyn TransactionHandler,
        op: OperationId,
        steps: u32,
        of: u32,
    ) {
        let size = u128::from(self.graph.get(op).download_size);
        let of = u128::from(of.max(1));
        for step in 1..=steps {
            let bytes = size * u128::from(step) / of;
            let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);
            handler.on_progress(&self.graph, op, ProgressReport::bytes(bytes));
        }
    }
}

impl TransactionRunner for PlannedRunner {
    fn graph(&self) -> &dyn OperationGraph {
        &self.graph
    }

    fn run(&mut self, handler: &mut dyn TransactionHandler) -> Result<(), Error> {
        if !handler.on_ready(&self.graph) {
            return Err(TransactionError::Aborted {
                message: "cancelled before any operation started".to_string(),
            }
            .into());
        }

        let mut failed = None;
        for op in self.graph.operations() {
            let scripted = self.graph.get(op).clone();
            if let Some(notice) = &scripted.end_of_life {
                handler.on_end_of_lifed(&self.graph, &mut self.rebases, op, notice);
            }
            handler.on_new_operation(&self.graph, op);
            handler.on_progress(&self.graph, op, ProgressReport::estimating());

            let message = scripted
                .message
                .clone()
                .unwrap_or_else(|| format!("scripted {:?}", scripted.outcome).to_lowercase());
            let (error, non_fatal) = match scripted.outcome {
                Outcome::Success | Outcome::NoChange => {
                    let steps = scripted.progress_steps;
                    self.report_bytes(handler, op, steps, steps);
                    let result = if scripted.outcome == Outcome::Success {
                        OperationResult::Changed
                    } else {
                        OperationResult::NoChange
                    };
                    handler.on_operation_done(&self.graph, op, result);
                    continue;
                }
                Outcome::Skip => (
                    Error::from(TransactionError::Skipped {
                        reference: scripted.reference.clone(),
                        message,
                    }),
                    false,
                ),
                Outcome::Cancel => (Error::Cancelled, false),
                Outcome::Fail | Outcome::NonFatal => {
                    // fail halfway through the download
                    let steps = scripted.progress_steps;
                    self.report_bytes(handler, op, steps / 2, steps);
                    (
                        Error::from(TransactionError::OperationFailed {
                            reference: scripted.reference.clone(),
                            kind: scripted.kind.to_string(),
                            message,
                        }),
                        scripted.outcome == Outcome::NonFatal,
                    )
                }
            };

            let carry_on = handler.on_operation_error(&self.graph, op, &error, non_fatal);
            if error.is_cancelled() {
                return Err(error);
            }
            if !carry_on {
                return Err(TransactionError::Aborted {
                    message: format!("stopped after {} failed", scripted.reference),
                }
                .into());
            }
            if scripted.outcome == Outcome::Fail && failed.is_none() {
                failed = Some(error);
            }
        }

        match failed {
            Some(error) => Err(TransactionError::RunFailed {
                message: format!("one or more operations failed, first: {error}"),
            }
            .into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"
[[apps]]
reference = "app/org.example.App/x86_64/stable"
state = "available"
runtime = "runtime/org.example.Platform/x86_64/1"

[[apps]]
reference = "runtime/org.example.Platform/x86_64/1"

[[operations]]
reference = "runtime/org.example.Platform/x86_64/1"
kind = "install"
download_size = 1500
related_to = ["app/org.example.App/x86_64/stable"]

[[operations]]
reference = "app/org.example.App/x86_64/stable"
kind = "install"
download_size = 500
"#;

    #[test]
    fn parses_and_wires_runtimes() {
        let plan = Plan::from_toml(PLAN).unwrap();
        let apps = plan.build_apps().unwrap();
        assert_eq!(apps.len(), 2);
        let runtime = apps[0].runtime().unwrap();
        assert_eq!(runtime.reference(), "runtime/org.example.Platform/x86_64/1");
        assert_eq!(apps[0].state(), AppState::Available);
    }

    #[test]
    fn resolves_related_refs_to_ids() {
        let runner = Plan::from_toml(PLAN).unwrap().into_runner().unwrap();
        let graph = runner.plan_graph();
        assert_eq!(
            graph.related_to(OperationId::new(0)),
            vec![OperationId::new(1)]
        );
        assert_eq!(graph.kind(OperationId::new(1)), OperationKind::Install);
        assert_eq!(graph.outcome(OperationId::new(1)), Outcome::Success);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let plan = Plan::from_toml(
            r#"
[[operations]]
reference = "a"
kind = "downgrade"
"#,
        )
        .unwrap();
        let err = plan.into_runner().unwrap_err();
        assert!(matches!(
            err,
            Error::Transaction(TransactionError::UnknownOperationKind { ref kind }) if kind == "downgrade"
        ));
    }

    #[test]
    fn dangling_relation_is_rejected() {
        let plan = Plan::from_toml(
            r#"
[[operations]]
reference = "a"
kind = "install"
related_to = ["b"]
"#,
        )
        .unwrap();
        assert!(matches!(
            plan.into_runner().unwrap_err(),
            Error::Transaction(TransactionError::InvalidPlan { .. })
        ));
    }

    #[test]
    fn missing_runtime_app_is_rejected() {
        let plan = Plan::from_toml(
            r#"
[[apps]]
reference = "a"
runtime = "nowhere"
"#,
        )
        .unwrap();
        assert!(plan.build_apps().is_err());
    }

    #[test]
    fn rebase_of_missing_ref_is_not_installed() {
        let mut queue = RebaseQueue {
            not_installed: HashSet::from(["old".to_string()]),
            queued: Vec::new(),
        };
        let err = queue
            .add_rebase_and_uninstall("origin", "new", "old")
            .unwrap_err();
        assert!(err.is_not_installed());
        queue
            .add_rebase_and_uninstall("origin", "new", "other")
            .unwrap();
        assert_eq!(queue.queued.len(), 1);
    }
}
