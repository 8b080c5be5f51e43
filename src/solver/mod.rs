//! Search strategies.
//!
//! Every strategy takes a [`CostMatrix`] and a [`Deadline`] and returns the
//! improving sequence of [`SolutionStats`] it found, never empty: a run that
//! finds no feasible tour returns the sentinel record alone. The last entry
//! is always the best.
//!
//! - [`random_tour`]: uniformly random permutations
//! - [`greedy_tour`]: nearest-neighbor from every start node
//! - [`dfs`]: exhaustive depth-first enumeration
//! - [`branch_and_bound`]: best-first search with a cheapest-edge bound
//! - [`branch_and_bound_smart`]: best-first search with a reduced-matrix bound

mod bnb;
mod dfs;
mod greedy;
mod random;

pub use bnb::{
    branch_and_bound, branch_and_bound_smart, lower_bound, BranchAndBoundSolver,
    SmartBranchAndBoundSolver,
};
pub use dfs::{dfs, DfsSolver};
pub use greedy::{create_greedy_tour, greedy_tour, GreedySolver};
pub use random::{random_tour, RandomSolver};

use crate::config::{SolveConfig, Strategy};
use crate::error::Result;
use crate::matrix::CostMatrix;
use crate::stats::SolutionStats;
use crate::timer::{Deadline, Timer};

/// A search that turns a cost matrix and a deadline into improving
/// solutions.
pub trait TspSolver {
    fn name(&self) -> &'static str;

    /// Runs the search until it finishes or `deadline` expires.
    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats>;
}

/// Builds the solver selected by `config`.
pub fn solver_for(config: &SolveConfig) -> Box<dyn TspSolver> {
    match config.strategy {
        Strategy::Random => Box::new(RandomSolver::new(config.seed)),
        Strategy::Greedy => Box::new(GreedySolver),
        Strategy::Dfs => Box::new(DfsSolver),
        Strategy::BranchAndBound => Box::new(BranchAndBoundSolver),
        Strategy::BranchAndBoundSmart => Box::new(SmartBranchAndBoundSolver),
    }
}

/// Validates `config`, starts its timer and runs the selected strategy.
///
/// # Examples
///
/// ```
/// use tsp_anytime::config::{SolveConfig, Strategy};
/// use tsp_anytime::matrix::CostMatrix;
/// use tsp_anytime::solver::solve;
///
/// let inf = f64::INFINITY;
/// let matrix = CostMatrix::new(vec![
///     vec![inf, 1.0, 2.0, 3.0],
///     vec![1.0, inf, 4.0, 5.0],
///     vec![2.0, 4.0, inf, 6.0],
///     vec![3.0, 5.0, 6.0, inf],
/// ])
/// .unwrap();
///
/// let config = SolveConfig::default().with_strategy(Strategy::Dfs);
/// let records = solve(&matrix, &config).unwrap();
/// assert_eq!(records.last().unwrap().score, 14.0);
/// ```
pub fn solve(matrix: &CostMatrix, config: &SolveConfig) -> Result<Vec<SolutionStats>> {
    config.validate()?;
    let timer = Timer::from_millis(config.time_limit_ms);
    Ok(solver_for(config).solve(matrix, &timer))
}

/// Visited flags for the nodes of `tour`.
fn visited_mask(n: usize, tour: &[usize]) -> Vec<bool> {
    let mut visited = vec![false; n];
    for &node in tour {
        visited[node] = true;
    }
    visited
}
