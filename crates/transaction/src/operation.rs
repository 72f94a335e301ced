//! Operations as reported by a runner

use std::fmt;
use txflow_types::OperationKind;

/// Opaque handle to one operation in a runner's plan.
///
/// Handles are only meaningful for the [`OperationGraph`] that produced
/// them. They index the graph's full operation list, skipped ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(usize);

impl OperationId {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Read-only view of a runner's finalized plan.
pub trait OperationGraph {
    /// Non-skipped operations in plan order.
    fn operations(&self) -> Vec<OperationId>;

    /// Operations whose presence caused `op` to be planned, skipped ones included.
    fn related_to(&self, op: OperationId) -> Vec<OperationId>;

    fn is_skipped(&self, op: OperationId) -> bool;

    /// Bytes the runner expects to download for `op`.
    fn download_size(&self, op: OperationId) -> u64;

    fn reference(&self, op: OperationId) -> &str;

    fn kind(&self, op: OperationId) -> OperationKind;
}

/// How a successful operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Something was written to disk
    Changed,
    /// The operation succeeded without anything to do
    NoChange,
}

/// One progress notification for a running operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressReport {
    pub bytes_transferred: u64,
    /// Metadata-only phase; the byte count is meaningless
    pub is_estimating: bool,
}

impl ProgressReport {
    #[must_use]
    pub fn bytes(bytes_transferred: u64) -> Self {
        Self {
            bytes_transferred,
            is_estimating: false,
        }
    }

    #[must_use]
    pub fn estimating() -> Self {
        Self {
            bytes_transferred: 0,
            is_estimating: true,
        }
    }
}

/// End-of-life notice for an operation's ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfLife {
    /// Remote the replacement should come from
    pub remote: String,
    pub reason: Option<String>,
    /// Replacement ref, when the publisher named one
    pub rebased_to: Option<String>,
}
