//! Outcome collection and reordering.
//!
//! Collects per-file outcomes keyed by work-item index and restores
//! the original input order before anything is persisted. Pure
//! transformation: no I/O happens here.

use tracing::warn;

use crate::models::{BatchStatistics, ErrorKind, FileOutcome};

/// Index-keyed accumulator for per-file outcomes.
pub struct ResultAggregator {
    slots: Vec<Option<FileOutcome>>,
}

impl ResultAggregator {
    /// Create an aggregator for a batch of known size.
    pub fn new(total: usize) -> Self {
        Self {
            slots: (0..total).map(|_| None).collect(),
        }
    }

    /// Record the outcome for one work-item index.
    ///
    /// The first outcome for an index wins; duplicates indicate a
    /// pool bug and are dropped with a warning rather than
    /// double-counted.
    pub fn record(&mut self, index: usize, outcome: FileOutcome) {
        match self.slots.get_mut(index) {
            Some(slot @ None) => *slot = Some(outcome),
            Some(_) => warn!("Duplicate outcome for index {}, keeping first", index),
            None => warn!("Outcome index {} out of range, dropped", index),
        }
    }

    /// Number of outcomes recorded so far.
    pub fn recorded(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Consume the aggregator, returning outcomes in input order.
    ///
    /// A slot that never received an outcome becomes an `Unknown`
    /// failure so the report length always equals the input count.
    pub fn into_ordered(self) -> Vec<FileOutcome> {
        self.slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    FileOutcome::failure(ErrorKind::Unknown, "no outcome recorded", "")
                })
            })
            .collect()
    }

    /// Compute statistics over the outcomes recorded so far, in
    /// index order. Recomputed wholesale on every call.
    pub fn statistics(&self) -> BatchStatistics {
        let ordered: Vec<FileOutcome> = self
            .slots
            .iter()
            .filter_map(|slot| slot.clone())
            .collect();
        BatchStatistics::compute(&ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorders_out_of_order_completions() {
        let mut agg = ResultAggregator::new(3);
        agg.record(2, FileOutcome::failure(ErrorKind::Unknown, "z", "/c.pdf"));
        agg.record(0, FileOutcome::failure(ErrorKind::Unknown, "x", "/a.pdf"));
        agg.record(1, FileOutcome::failure(ErrorKind::Unknown, "y", "/b.pdf"));

        let ordered = agg.into_ordered();
        let paths: Vec<_> = ordered.iter().map(|o| o.path().to_string()).collect();
        assert_eq!(paths, vec!["/a.pdf", "/b.pdf", "/c.pdf"]);
    }

    #[test]
    fn duplicate_outcomes_are_not_double_counted() {
        let mut agg = ResultAggregator::new(1);
        agg.record(0, FileOutcome::failure(ErrorKind::NotFound, "first", "/a.pdf"));
        agg.record(0, FileOutcome::failure(ErrorKind::Unknown, "second", "/a.pdf"));

        assert_eq!(agg.recorded(), 1);
        let ordered = agg.into_ordered();
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].as_failure().unwrap().message, "first");
    }

    #[test]
    fn missing_outcomes_are_filled_not_dropped() {
        let agg = ResultAggregator::new(2);
        let ordered = agg.into_ordered();
        assert_eq!(ordered.len(), 2);
        assert!(ordered.iter().all(|o| !o.is_success()));
    }

    #[test]
    fn statistics_on_demand() {
        let mut agg = ResultAggregator::new(2);
        agg.record(0, FileOutcome::failure(ErrorKind::CorruptDocument, "e", "/a.pdf"));
        let stats = agg.statistics();
        assert_eq!(stats.summary.total_files, 1);
        agg.record(1, FileOutcome::failure(ErrorKind::NotFound, "e", "/b.pdf"));
        let stats = agg.statistics();
        assert_eq!(stats.summary.total_files, 2);
    }
}
