//! Traversals over the related-to graph of a plan
//!
//! Runners are known to produce plans whose related-to edges form cycles,
//! so every walk here is an explicit worklist with a visited set.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::operation::{OperationGraph, OperationId};

/// A snapshot of a plan's ordering, taken once per notification.
pub(crate) struct PlanView<'g> {
    graph: &'g dyn OperationGraph,
    operations: Vec<OperationId>,
    positions: HashMap<OperationId, usize>,
}

impl<'g> PlanView<'g> {
    pub(crate) fn new(graph: &'g dyn OperationGraph) -> Self {
        let operations = graph.operations();
        let positions = operations
            .iter()
            .enumerate()
            .map(|(position, op)| (*op, position))
            .collect();
        Self {
            graph,
            operations,
            positions,
        }
    }

    pub(crate) fn graph(&self) -> &'g dyn OperationGraph {
        self.graph
    }

    pub(crate) fn operations(&self) -> &[OperationId] {
        &self.operations
    }

    /// Whether `op` is `root` or reaches `root` through related-to edges.
    pub(crate) fn is_related(&self, op: OperationId, root: OperationId) -> bool {
        if op == root {
            return true;
        }
        let mut seen = HashSet::from([op]);
        let mut stack = vec![op];
        while let Some(current) = stack.pop() {
            for next in self.graph.related_to(current) {
                if next == root {
                    return true;
                }
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Visit `start` and everything reachable from it through related-to
    /// edges, each operation at most once, breadth first.
    ///
    /// `visit` returns whether to keep walking past the operation it was given.
    pub(crate) fn walk_up<F>(&self, start: OperationId, mut visit: F)
    where
        F: FnMut(OperationId) -> bool,
    {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(root) = queue.pop_front() {
            if !visit(root) {
                continue;
            }
            for related in self.graph.related_to(root) {
                if visited.insert(related) {
                    queue.push_back(related);
                }
            }
        }
    }

    /// Whether an operation after `current` in plan order also names
    /// `skipped` among its related-to operations.
    pub(crate) fn later_op_also_related(&self, current: OperationId, skipped: OperationId) -> bool {
        let Some(&position) = self.positions.get(&current) else {
            return false;
        };
        self.operations[position + 1..]
            .iter()
            .any(|later| self.graph.related_to(*later).contains(&skipped))
    }
}

/// Total download size of every operation related to `root`, `root` included.
#[must_use]
pub fn related_download_size(graph: &dyn OperationGraph, root: OperationId) -> u64 {
    let view = PlanView::new(graph);
    view.operations()
        .iter()
        .filter(|op| view.is_related(**op, root))
        .fold(0u64, |total, op| total.saturating_add(graph.download_size(*op)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use txflow_types::OperationKind;

    /// Hand-built plan for exercising traversals
    #[derive(Default)]
    pub(crate) struct FakeGraph {
        pub(crate) refs: Vec<String>,
        pub(crate) sizes: Vec<u64>,
        pub(crate) skipped: Vec<bool>,
        pub(crate) kinds: Vec<OperationKind>,
        pub(crate) edges: Vec<Vec<OperationId>>,
    }

    impl FakeGraph {
        pub(crate) fn op(mut self, reference: &str, kind: OperationKind, size: u64) -> Self {
            self.refs.push(reference.to_string());
            self.sizes.push(size);
            self.skipped.push(false);
            self.kinds.push(kind);
            self.edges.push(Vec::new());
            self
        }

        pub(crate) fn skipped(mut self, index: usize) -> Self {
            self.skipped[index] = true;
            self
        }

        pub(crate) fn edge(mut self, from: usize, to: usize) -> Self {
            self.edges[from].push(OperationId::new(to));
            self
        }
    }

    impl OperationGraph for FakeGraph {
        fn operations(&self) -> Vec<OperationId> {
            (0..self.refs.len())
                .filter(|i| !self.skipped[*i])
                .map(OperationId::new)
                .collect()
        }

        fn related_to(&self, op: OperationId) -> Vec<OperationId> {
            self.edges[op.index()].clone()
        }

        fn is_skipped(&self, op: OperationId) -> bool {
            self.skipped[op.index()]
        }

        fn download_size(&self, op: OperationId) -> u64 {
            self.sizes[op.index()]
        }

        fn reference(&self, op: OperationId) -> &str {
            &self.refs[op.index()]
        }

        fn kind(&self, op: OperationId) -> OperationKind {
            self.kinds[op.index()]
        }
    }

    fn id(index: usize) -> OperationId {
        OperationId::new(index)
    }

    #[test]
    fn relation_is_reflexive_and_transitive() {
        let graph = FakeGraph::default()
            .op("a", OperationKind::Install, 1)
            .op("b", OperationKind::Install, 1)
            .op("c", OperationKind::Install, 1)
            .edge(0, 1)
            .edge(1, 2);
        let view = PlanView::new(&graph);

        assert!(view.is_related(id(0), id(0)));
        assert!(view.is_related(id(0), id(2)));
        assert!(!view.is_related(id(2), id(0)));
    }

    #[test]
    fn walk_terminates_on_cycles_and_visits_once() {
        let graph = FakeGraph::default()
            .op("a", OperationKind::Install, 1)
            .op("b", OperationKind::Install, 1)
            .edge(0, 1)
            .edge(1, 0)
            .edge(1, 1);
        let view = PlanView::new(&graph);

        let mut visits = Vec::new();
        view.walk_up(id(0), |op| {
            visits.push(op);
            true
        });
        assert_eq!(visits, vec![id(0), id(1)]);
        assert!(!view.is_related(id(0), id(2)));
    }

    #[test]
    fn walk_does_not_continue_past_abandoned_branch() {
        let graph = FakeGraph::default()
            .op("a", OperationKind::Install, 1)
            .op("b", OperationKind::Install, 1)
            .op("c", OperationKind::Install, 1)
            .edge(0, 1)
            .edge(1, 2);
        let view = PlanView::new(&graph);

        let mut visits = Vec::new();
        view.walk_up(id(0), |op| {
            visits.push(op);
            op != id(1)
        });
        assert_eq!(visits, vec![id(0), id(1)]);
    }

    #[test]
    fn later_relation_ignores_earlier_operations() {
        let graph = FakeGraph::default()
            .op("app", OperationKind::Install, 1)
            .op("runtime", OperationKind::Install, 1)
            .op("locale", OperationKind::Install, 1)
            .op("extension", OperationKind::Install, 1)
            .skipped(2)
            .edge(0, 2)
            .edge(1, 2)
            .edge(3, 0);
        let view = PlanView::new(&graph);

        assert!(view.later_op_also_related(id(0), id(2)));
        assert!(!view.later_op_also_related(id(1), id(2)));
        assert!(!view.later_op_also_related(id(3), id(2)));
    }

    #[test]
    fn related_download_size_skips_skipped_operations() {
        let graph = FakeGraph::default()
            .op("app", OperationKind::Install, 500)
            .op("runtime", OperationKind::Install, 1500)
            .op("locale", OperationKind::Install, 70)
            .skipped(2)
            .edge(0, 1)
            .edge(2, 1);

        assert_eq!(related_download_size(&graph, id(1)), 2000);
        assert_eq!(related_download_size(&graph, id(0)), 500);
    }
}
