//! Random permutation sampling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::TspSolver;
use crate::matrix::{score_tour, CostMatrix};
use crate::stats::{SearchLedger, SolutionStats};
use crate::timer::Deadline;

/// Samples uniformly random permutations of all nodes until `deadline`
/// expires, keeping each one that strictly beats the last kept sample.
///
/// Infeasible and non-improving samples count as pruned. This never ends
/// on its own; give it a bounded deadline.
pub fn random_tour<R: Rng + ?Sized>(
    matrix: &CostMatrix,
    deadline: &dyn Deadline,
    rng: &mut R,
) -> Vec<SolutionStats> {
    let n = matrix.len();
    let mut ledger = SearchLedger::new("random", n);
    if n == 0 {
        return ledger.finish(deadline);
    }

    let mut tour: Vec<usize> = (0..n).collect();
    while !deadline.time_out() {
        tour.shuffle(rng);
        ledger.expand();

        let cost = score_tour(&tour, matrix);
        if cost.is_infinite() || cost >= ledger.best_score() {
            ledger.prune_cut(&tour);
            continue;
        }
        ledger.record(tour.clone(), cost, deadline);
    }

    ledger.finish(deadline)
}

/// [`random_tour`] with its own seeded generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSolver {
    seed: Option<u64>,
}

impl RandomSolver {
    /// `None` draws a fresh seed on every run.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }
}

impl TspSolver for RandomSolver {
    fn name(&self) -> &'static str {
        "random"
    }

    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        let mut rng = StdRng::seed_from_u64(self.seed.unwrap_or_else(rand::random));
        random_tour(matrix, deadline, &mut rng)
    }
}
