//! Multi-start nearest-neighbor construction.

use super::TspSolver;
use crate::matrix::{score_tour, CostMatrix};
use crate::stats::{SearchLedger, SolutionStats};
use crate::timer::Deadline;

/// Builds one nearest-neighbor tour from `start`.
///
/// At each step moves to the cheapest unvisited node reachable by a finite
/// edge, lowest index first on ties. Returns the tour built so far and
/// whether it is a complete cycle; it is incomplete if the walk gets stuck
/// or the edge back to `start` is absent.
///
/// # Examples
///
/// ```
/// use tsp_anytime::matrix::CostMatrix;
/// use tsp_anytime::solver::create_greedy_tour;
///
/// let inf = f64::INFINITY;
/// let m = CostMatrix::new(vec![
///     vec![inf, 1.0, 5.0],
///     vec![5.0, inf, 1.0],
///     vec![1.0, 5.0, inf],
/// ])
/// .unwrap();
/// assert_eq!(create_greedy_tour(&m, 0), (vec![0, 1, 2], true));
/// ```
pub fn create_greedy_tour(matrix: &CostMatrix, start: usize) -> (Vec<usize>, bool) {
    let n = matrix.len();
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    visited[start] = true;
    tour.push(start);

    let mut current = start;
    while tour.len() < n {
        let nearest = (0..n)
            .filter(|&next| !visited[next] && matrix.has_edge(current, next))
            .fold(None, |best: Option<usize>, next| match best {
                Some(b) if matrix.cost(current, b) <= matrix.cost(current, next) => Some(b),
                _ => Some(next),
            });

        let Some(next) = nearest else {
            return (tour, false);
        };
        visited[next] = true;
        tour.push(next);
        current = next;
    }

    let complete = matrix.closing_cost(current, start).is_finite();
    (tour, complete)
}

/// Runs [`create_greedy_tour`] from every start node in index order,
/// keeping each completed tour that strictly beats the last one kept.
///
/// Incomplete and non-improving attempts count as pruned.
pub fn greedy_tour(matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
    let n = matrix.len();
    let mut ledger = SearchLedger::new("greedy", n);

    for start in 0..n {
        if deadline.time_out() {
            break;
        }

        let (tour, complete) = create_greedy_tour(matrix, start);
        ledger.expand();

        if !complete {
            ledger.prune_cut(&tour);
            continue;
        }

        let cost = score_tour(&tour, matrix);
        if cost >= ledger.best_score() {
            ledger.prune_cut(&tour);
            continue;
        }
        ledger.record(tour, cost, deadline);
    }

    ledger.finish(deadline)
}

/// Strategy wrapper for [`greedy_tour`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver;

impl TspSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        greedy_tour(matrix, deadline)
    }
}
