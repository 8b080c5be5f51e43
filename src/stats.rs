//! Solution records and the search-effort ledger shared by all strategies.

use std::time::Duration;

use tracing::{debug, info};

use crate::coverage::CutTree;
use crate::timer::Deadline;

/// One improving solution, with the search effort spent to reach it.
///
/// A run that finds nothing within its budget reports a single sentinel
/// record: empty tour, infinite score, frontier size 1, and the effort
/// counters at the time the run stopped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionStats {
    /// The tour, as visited. Empty for the sentinel.
    pub tour: Vec<usize>,

    /// Cycle cost of `tour`.
    pub score: f64,

    /// Wall-clock time since the run started.
    pub time: Duration,

    /// Largest frontier seen so far (1 for strategies without a frontier).
    pub max_queue_size: usize,

    /// States (or whole samples) generated so far.
    pub n_nodes_expanded: usize,

    /// States (or whole samples) discarded so far.
    pub n_nodes_pruned: usize,

    /// Leaves of the permutation tree eliminated by cuts.
    pub n_leaves_covered: f64,

    /// `n_leaves_covered / n!`.
    pub fraction_leaves_covered: f64,
}

impl SolutionStats {
    /// Whether this is the "nothing found" record.
    pub fn is_sentinel(&self) -> bool {
        self.tour.is_empty() && self.score.is_infinite()
    }
}

/// Counters, cut tree and records for a single run.
///
/// Strategies bump the counters as they search and call [`record`] for
/// every accepted tour; [`finish`] hands back the records, substituting the
/// sentinel when there are none.
///
/// [`record`]: SearchLedger::record
/// [`finish`]: SearchLedger::finish
#[derive(Debug)]
pub struct SearchLedger {
    strategy: &'static str,
    records: Vec<SolutionStats>,
    cut_tree: CutTree,
    max_queue_size: usize,
    n_nodes_expanded: usize,
    n_nodes_pruned: usize,
}

impl SearchLedger {
    pub fn new(strategy: &'static str, n: usize) -> Self {
        Self {
            strategy,
            records: Vec::new(),
            cut_tree: CutTree::new(n),
            max_queue_size: 1,
            n_nodes_expanded: 0,
            n_nodes_pruned: 0,
        }
    }

    /// Counts one generated state.
    pub fn expand(&mut self) {
        self.n_nodes_expanded += 1;
    }

    /// Counts one discarded state without charging the cut tree.
    pub fn prune(&mut self) {
        self.n_nodes_pruned += 1;
    }

    /// Counts one discarded state and cuts its prefix.
    pub fn prune_cut(&mut self, prefix: &[usize]) {
        self.n_nodes_pruned += 1;
        self.cut_tree.cut(prefix);
    }

    /// Updates the frontier high-water mark.
    pub fn observe_frontier(&mut self, len: usize) {
        self.max_queue_size = self.max_queue_size.max(len);
    }

    /// Score of the latest record, or infinity if there is none.
    pub fn best_score(&self) -> f64 {
        self.records.last().map_or(f64::INFINITY, |r| r.score)
    }

    /// Appends a record carrying the current counters.
    pub fn record(&mut self, tour: Vec<usize>, score: f64, deadline: &dyn Deadline) {
        debug!(
            strategy = self.strategy,
            score,
            expanded = self.n_nodes_expanded,
            pruned = self.n_nodes_pruned,
            max_queue = self.max_queue_size,
            "new incumbent"
        );
        let stats = self.snapshot(tour, score, deadline.elapsed());
        self.records.push(stats);
    }

    /// Consumes the ledger, returning at least one record.
    pub fn finish(self, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        let elapsed = deadline.elapsed();
        info!(
            strategy = self.strategy,
            records = self.records.len(),
            best = self.best_score(),
            expanded = self.n_nodes_expanded,
            pruned = self.n_nodes_pruned,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );
        if self.records.is_empty() {
            let mut sentinel = self.snapshot(Vec::new(), f64::INFINITY, elapsed);
            sentinel.max_queue_size = 1;
            vec![sentinel]
        } else {
            self.records
        }
    }

    fn snapshot(&self, tour: Vec<usize>, score: f64, time: Duration) -> SolutionStats {
        SolutionStats {
            tour,
            score,
            time,
            max_queue_size: self.max_queue_size,
            n_nodes_expanded: self.n_nodes_expanded,
            n_nodes_pruned: self.n_nodes_pruned,
            n_leaves_covered: self.cut_tree.n_leaves_cut(),
            fraction_leaves_covered: self.cut_tree.fraction_leaves_covered(),
        }
    }
}
