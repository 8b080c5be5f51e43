//! Exhaustive depth-first search.

use super::{visited_mask, TspSolver};
use crate::matrix::CostMatrix;
use crate::stats::{SearchLedger, SolutionStats};
use crate::timer::Deadline;

/// A partial tour waiting on the stack.
#[derive(Debug, Clone)]
struct PartialTour {
    node: usize,
    tour: Vec<usize>,
    cost: f64,
}

/// Enumerates every Hamiltonian cycle from node 0 depth-first, keeping each
/// complete tour that strictly beats the incumbent.
///
/// Children are pushed in ascending node order, so the highest-numbered
/// neighbor is explored first. Edges that are absent or lead back into the
/// tour count as pruned, as do complete tours that cannot close or do not
/// improve. There is no bound beyond the incumbent comparison at the
/// leaves, so a full run is factorial in the number of nodes.
pub fn dfs(matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
    let n = matrix.len();
    let mut ledger = SearchLedger::new("dfs", n);
    if n == 0 {
        return ledger.finish(deadline);
    }

    let mut stack = vec![PartialTour {
        node: 0,
        tour: vec![0],
        cost: 0.0,
    }];
    ledger.expand();

    loop {
        if deadline.time_out() {
            break;
        }
        let Some(PartialTour { node, tour, cost }) = stack.pop() else {
            break;
        };

        if tour.len() == n {
            let total = cost + matrix.closing_cost(node, 0);
            if total.is_infinite() || total >= ledger.best_score() {
                ledger.prune_cut(&tour);
            } else {
                ledger.record(tour, total, deadline);
            }
            continue;
        }

        let visited = visited_mask(n, &tour);
        for next in 0..n {
            if visited[next] {
                ledger.prune();
                continue;
            }
            let mut extended = tour.clone();
            extended.push(next);
            if !matrix.has_edge(node, next) {
                ledger.prune_cut(&extended);
                continue;
            }

            stack.push(PartialTour {
                node: next,
                tour: extended,
                cost: cost + matrix.cost(node, next),
            });
            ledger.expand();
            ledger.observe_frontier(stack.len());
        }
    }

    ledger.finish(deadline)
}

/// Strategy wrapper for [`dfs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DfsSolver;

impl TspSolver for DfsSolver {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        dfs(matrix, deadline)
    }
}
