//! Turning per-operation byte counts into per-app percentages

use crate::graph::PlanView;
use crate::operation::OperationId;
use txflow_types::Progress;

/// Byte totals for one root of an aggregation walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct RelatedBytes {
    /// Everything related to the root
    pub(crate) total: u64,
    /// The part of `total` planned strictly before the notifying operation
    pub(crate) prior: u64,
}

impl PlanView<'_> {
    /// Sum download sizes of every planned operation related to `root`.
    ///
    /// Relies on the runner executing operations in plan order: anything
    /// listed before `current` is treated as fully downloaded.
    pub(crate) fn related_bytes(&self, current: OperationId, root: OperationId) -> RelatedBytes {
        let graph = self.graph();
        let mut bytes = RelatedBytes::default();
        let mut seen_current = false;

        for &op in self.operations() {
            if op == current {
                seen_current = true;
            }
            if !self.is_related(op, root) {
                continue;
            }
            let size = graph.download_size(op);
            bytes.total = bytes.total.saturating_add(size);
            if !seen_current {
                bytes.prior = bytes.prior.saturating_add(size);
            }
        }
        bytes
    }
}

/// `prior * 100 / total + transferred * 100 / total`, or 0 for an empty total.
///
/// When either byte count is too large to multiply by 100, all three values
/// are scaled down by 100 first.
#[must_use]
pub fn weighted_percent(prior: u64, transferred: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let (prior, transferred, total) = if prior > u64::MAX / 100 || transferred > u64::MAX / 100 {
        (prior / 100, transferred / 100, (total / 100).max(1))
    } else {
        (prior, transferred, total)
    };
    (prior * 100 / total).saturating_add(transferred.saturating_mul(100) / total)
}

/// Outcome of offering a new percentage to an app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressUpdate {
    Written(u8),
    Unchanged,
    /// Would have gone backwards from `current`
    Discarded { current: u8, computed: u8 },
}

/// Decide whether `computed` may replace `current`.
///
/// A finished (100) or unknown value can always be replaced; anything else
/// only moves forward.
pub(crate) fn monotonic_update(current: Progress, computed: u64) -> ProgressUpdate {
    let Some(computed) = Progress::percent(computed).as_percent() else {
        return ProgressUpdate::Unchanged;
    };
    match current {
        Progress::Unknown | Progress::Percent(100) => ProgressUpdate::Written(computed),
        Progress::Percent(value) if value == computed => ProgressUpdate::Unchanged,
        Progress::Percent(value) if value < computed => ProgressUpdate::Written(computed),
        Progress::Percent(value) => ProgressUpdate::Discarded {
            current: value,
            computed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::FakeGraph;
    use txflow_types::OperationKind;

    #[test]
    fn weighted_example() {
        // app (500) related to runtime (1500); runtime reports 750 bytes
        let graph = FakeGraph::default()
            .op("app", OperationKind::Install, 500)
            .op("runtime", OperationKind::Install, 1500)
            .edge(0, 1);
        let view = PlanView::new(&graph);
        let runtime = OperationId::new(1);

        let bytes = view.related_bytes(runtime, runtime);
        assert_eq!(bytes, RelatedBytes { total: 2000, prior: 500 });
        assert_eq!(weighted_percent(bytes.prior, 750, bytes.total), 62);
    }

    #[test]
    fn empty_total_is_zero() {
        assert_eq!(weighted_percent(0, 10, 0), 0);
    }

    #[test]
    fn huge_values_do_not_overflow() {
        let total = u64::MAX;
        let percent = weighted_percent(total / 2, total / 4, total);
        assert!((74..=75).contains(&percent), "{percent}");
    }

    #[test]
    fn overshoot_is_clamped_by_the_app() {
        assert_eq!(
            monotonic_update(Progress::Percent(10), weighted_percent(0, 300, 100)),
            ProgressUpdate::Written(100)
        );
    }

    #[test]
    fn regressions_are_discarded() {
        assert_eq!(
            monotonic_update(Progress::Percent(40), 30),
            ProgressUpdate::Discarded {
                current: 40,
                computed: 30
            }
        );
        assert_eq!(
            monotonic_update(Progress::Percent(100), 5),
            ProgressUpdate::Written(5)
        );
        assert_eq!(
            monotonic_update(Progress::Unknown, 0),
            ProgressUpdate::Written(0)
        );
        assert_eq!(
            monotonic_update(Progress::Percent(40), 40),
            ProgressUpdate::Unchanged
        );
    }
}
