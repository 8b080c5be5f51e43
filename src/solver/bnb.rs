//! Best-first branch-and-bound.
//!
//! # Algorithm
//!
//! 1. Seed the incumbent with the best multi-start greedy tour
//! 2. Push the root state `[0]`
//! 3. Pop the state with the smallest lower bound:
//!    a. Complete tours close back to node 0 and replace the incumbent if
//!       strictly cheaper
//!    b. Otherwise every feasible one-node extension is bounded; those whose
//!       bound reaches the incumbent are cut, the rest are pushed
//! 4. Stop when the frontier is empty or the deadline expires
//!
//! Equal bounds pop in insertion order.
//!
//! Two bounds are provided. [`branch_and_bound`] adds the cheapest outgoing
//! edge of every unvisited node to the cost of the committed path.
//! [`branch_and_bound_smart`] carries a row/column-reduced matrix in each
//! state (Little et al., 1963).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::trace;

use super::greedy::greedy_tour;
use super::{visited_mask, TspSolver};
use crate::matrix::{reduce_flat, CostMatrix};
use crate::stats::{SearchLedger, SolutionStats};
use crate::timer::Deadline;

/// Lower bound of [`branch_and_bound`] for a partial tour: the committed
/// path cost plus the cheapest outgoing edge of every node not yet in the
/// tour.
///
/// Any completion leaves each unvisited node exactly once, so this never
/// exceeds the cost of the best completion.
pub fn lower_bound(matrix: &CostMatrix, tour: &[usize]) -> f64 {
    let path: f64 = tour.windows(2).map(|w| matrix.cost(w[0], w[1])).sum();
    let min_outgoing: Vec<f64> = (0..matrix.len()).map(|i| matrix.min_outgoing(i)).collect();
    cheapest_edge_bound(path, &min_outgoing, tour)
}

/// `path` plus `min_outgoing[i]` for every node `i` not in `tour`.
fn cheapest_edge_bound(path: f64, min_outgoing: &[f64], tour: &[usize]) -> f64 {
    let visited = visited_mask(min_outgoing.len(), tour);
    let remaining: f64 = min_outgoing
        .iter()
        .zip(&visited)
        .filter(|&(_, &seen)| !seen)
        .map(|(&c, _)| c)
        .sum();
    path + remaining
}

/// Frontier entry.
#[derive(Debug)]
struct Node<E> {
    bound: f64,
    seq: u64,
    tour: Vec<usize>,
    cost: f64,
    extra: E,
}

impl<E> Ord for Node<E> {
    /// Smaller bound first, then older entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<E> PartialOrd for Node<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> PartialEq for Node<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Node<E> {}

/// How a bound is computed and what each state carries to compute it.
trait BoundModel {
    type Extra;

    /// Bound and payload of the root state `[0]`.
    fn root(&self, matrix: &CostMatrix) -> (f64, Self::Extra);

    /// Bound and payload of `parent` extended by `next`; `tour` and `cost`
    /// already include the new edge.
    fn child(
        &self,
        matrix: &CostMatrix,
        parent: &Node<Self::Extra>,
        next: usize,
        tour: &[usize],
        cost: f64,
    ) -> (f64, Self::Extra);
}

/// Path cost plus per-node cheapest outgoing edge.
struct CheapestEdge {
    min_outgoing: Vec<f64>,
}

impl CheapestEdge {
    fn new(matrix: &CostMatrix) -> Self {
        Self {
            min_outgoing: (0..matrix.len()).map(|i| matrix.min_outgoing(i)).collect(),
        }
    }
}

impl BoundModel for CheapestEdge {
    type Extra = ();

    fn root(&self, _matrix: &CostMatrix) -> (f64, ()) {
        (0.0, ())
    }

    fn child(
        &self,
        _matrix: &CostMatrix,
        _parent: &Node<()>,
        _next: usize,
        tour: &[usize],
        cost: f64,
    ) -> (f64, ()) {
        (cheapest_edge_bound(cost, &self.min_outgoing, tour), ())
    }
}

/// Reduced-matrix bound.
///
/// Each state holds the reduced matrix of its subproblem. Extending `i ->
/// j` charges the reduced cost of that edge, blanks row `i` and column `j`,
/// forbids the early return `j -> 0`, and re-reduces. A remaining row or
/// column with no finite entry means no completion exists and the bound is
/// infinite.
struct ReducedMatrix;

impl BoundModel for ReducedMatrix {
    type Extra = Vec<f64>;

    fn root(&self, matrix: &CostMatrix) -> (f64, Vec<f64>) {
        let n = matrix.len();
        let mut reduced = matrix.to_flat();
        let total = reduce_flat(&mut reduced, n);
        if n > 1 && !open_lines_feasible(&reduced, n, &[0]) {
            return (f64::INFINITY, reduced);
        }
        (total, reduced)
    }

    fn child(
        &self,
        matrix: &CostMatrix,
        parent: &Node<Vec<f64>>,
        next: usize,
        tour: &[usize],
        _cost: f64,
    ) -> (f64, Vec<f64>) {
        let n = matrix.len();
        let from = parent.tour[parent.tour.len() - 1];
        let mut reduced = parent.extra.clone();
        let edge = reduced[from * n + next];

        reduced[from * n..(from + 1) * n].fill(f64::INFINITY);
        for row in 0..n {
            reduced[row * n + next] = f64::INFINITY;
        }
        if tour.len() < n {
            reduced[next * n] = f64::INFINITY;
        }

        let total = reduce_flat(&mut reduced, n);
        if !open_lines_feasible(&reduced, n, tour) {
            return (f64::INFINITY, reduced);
        }
        (parent.bound + edge + total, reduced)
    }
}

/// Whether every row still to be left and every column still to be entered
/// has a finite entry.
///
/// Open rows are the unvisited nodes plus the tail of `tour`; open columns
/// are the unvisited nodes plus node 0.
fn open_lines_feasible(reduced: &[f64], n: usize, tour: &[usize]) -> bool {
    let visited = visited_mask(n, tour);
    let tail = tour[tour.len() - 1];
    let row_open = |i: usize| (0..n).any(|j| reduced[i * n + j].is_finite());
    let col_open = |j: usize| (0..n).any(|i| reduced[i * n + j].is_finite());

    (0..n)
        .filter(|&i| !visited[i] || i == tail)
        .all(row_open)
        && (0..n).filter(|&j| !visited[j] || j == 0).all(col_open)
}

#[cfg(test)]
thread_local! {
    /// Every cut made on this thread: prefix, bound, incumbent.
    static CUT_LOG: std::cell::RefCell<Vec<(Vec<usize>, f64, f64)>> =
        const { std::cell::RefCell::new(Vec::new()) };
}

fn search<B: BoundModel>(
    name: &'static str,
    matrix: &CostMatrix,
    deadline: &dyn Deadline,
    model: &B,
) -> Vec<SolutionStats> {
    let n = matrix.len();
    let mut ledger = SearchLedger::new(name, n);
    if n == 0 {
        return ledger.finish(deadline);
    }
    ledger.expand();

    let mut incumbent = f64::INFINITY;
    if let Some(seed) = greedy_tour(matrix, deadline)
        .pop()
        .filter(|s| !s.is_sentinel())
    {
        incumbent = seed.score;
        ledger.record(seed.tour, seed.score, deadline);
    }

    let (bound, extra) = model.root(matrix);
    let mut seq = 0u64;
    let mut frontier = BinaryHeap::new();
    frontier.push(Node {
        bound,
        seq,
        tour: vec![0],
        cost: 0.0,
        extra,
    });

    loop {
        if deadline.time_out() {
            break;
        }
        let Some(node) = frontier.pop() else {
            break;
        };
        let last = node.tour[node.tour.len() - 1];

        if node.tour.len() == n {
            let total = node.cost + matrix.closing_cost(last, 0);
            if total < incumbent {
                incumbent = total;
                ledger.record(node.tour, total, deadline);
            }
            continue;
        }

        let visited = visited_mask(n, &node.tour);
        for next in 0..n {
            if visited[next] || !matrix.has_edge(last, next) {
                continue;
            }
            let mut tour = node.tour.clone();
            tour.push(next);
            let cost = node.cost + matrix.cost(last, next);

            let (bound, extra) = model.child(matrix, &node, next, &tour, cost);
            if bound >= incumbent {
                trace!(strategy = name, ?tour, bound, incumbent, "cut");
                #[cfg(test)]
                CUT_LOG.with(|log| log.borrow_mut().push((tour.clone(), bound, incumbent)));
                ledger.prune_cut(&tour);
                continue;
            }

            seq += 1;
            frontier.push(Node {
                bound,
                seq,
                tour,
                cost,
                extra,
            });
            ledger.expand();
            ledger.observe_frontier(frontier.len());
        }
    }

    ledger.finish(deadline)
}

/// Branch-and-bound with the [`lower_bound`] estimate.
pub fn branch_and_bound(matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
    search(
        "branch_and_bound",
        matrix,
        deadline,
        &CheapestEdge::new(matrix),
    )
}

/// Branch-and-bound with the reduced-matrix bound.
///
/// Tighter than [`branch_and_bound`] at the price of an `n x n` matrix per
/// frontier entry.
pub fn branch_and_bound_smart(matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
    search(
        "branch_and_bound_smart",
        matrix,
        deadline,
        &ReducedMatrix,
    )
}

/// Strategy wrapper for [`branch_and_bound`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl TspSolver for BranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch_and_bound"
    }

    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        branch_and_bound(matrix, deadline)
    }
}

/// Strategy wrapper for [`branch_and_bound_smart`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartBranchAndBoundSolver;

impl TspSolver for SmartBranchAndBoundSolver {
    fn name(&self) -> &'static str {
        "branch_and_bound_smart"
    }

    fn solve(&self, matrix: &CostMatrix, deadline: &dyn Deadline) -> Vec<SolutionStats> {
        branch_and_bound_smart(matrix, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::score_tour;
    use crate::solver::dfs;
    use crate::timer::{StepBudget, Timer};
    use proptest::prelude::*;

    const INF: f64 = f64::INFINITY;

    fn four_node() -> CostMatrix {
        CostMatrix::new(vec![
            vec![INF, 1.0, 2.0, 3.0],
            vec![1.0, INF, 4.0, 5.0],
            vec![2.0, 4.0, INF, 6.0],
            vec![3.0, 5.0, 6.0, INF],
        ])
        .unwrap()
    }

    /// Greedy's best tour is 1 -> 2 -> 3 -> 4 -> 0 (cost 30); the optimum
    /// 0 -> 2 -> 1 -> 3 -> 4 -> 0 costs 17.
    fn greedy_trap() -> CostMatrix {
        CostMatrix::new(vec![
            vec![INF, 20.0, 3.0, 5.0, 2.0],
            vec![20.0, INF, 1.0, 1.0, 9.0],
            vec![9.0, 5.0, INF, 1.0, 2.0],
            vec![20.0, 9.0, 3.0, INF, 3.0],
            vec![5.0, 20.0, 5.0, 2.0, INF],
        ])
        .unwrap()
    }

    /// Cheapest completion of `prefix` by brute force over the unvisited
    /// nodes.
    fn best_completion(matrix: &CostMatrix, prefix: &[usize]) -> f64 {
        let n = matrix.len();
        let visited = visited_mask(n, prefix);
        let rest: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();
        let mut best = INF;
        permute(&mut rest.clone(), 0, &mut |perm: &[usize]| {
            let mut tour = prefix.to_vec();
            tour.extend_from_slice(perm);
            best = best.min(score_tour(&tour, matrix));
        });
        best
    }

    fn permute(items: &mut Vec<usize>, k: usize, visit: &mut dyn FnMut(&[usize])) {
        if k == items.len() {
            visit(items);
            return;
        }
        for i in k..items.len() {
            items.swap(k, i);
            permute(items, k + 1, visit);
            items.swap(k, i);
        }
    }

    #[test]
    fn test_lower_bound_root_and_leaf() {
        let m = four_node();
        // Cheapest outgoing: 1, 1, 2, 3.
        assert_eq!(lower_bound(&m, &[0]), 1.0 + 2.0 + 3.0);
        assert_eq!(lower_bound(&m, &[0, 1, 2, 3]), 1.0 + 4.0 + 6.0);
    }

    #[test]
    fn test_node_order_is_min_bound_then_fifo() {
        let mut heap = BinaryHeap::new();
        for (seq, bound) in [(0, 5.0), (1, 3.0), (2, 3.0), (3, 4.0)] {
            heap.push(Node {
                bound,
                seq,
                tour: Vec::new(),
                cost: 0.0,
                extra: (),
            });
        }
        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|n| n.seq)).collect();
        assert_eq!(order, vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_four_node_optimum() {
        let m = four_node();
        for out in [
            branch_and_bound(&m, &Timer::unbounded()),
            branch_and_bound_smart(&m, &Timer::unbounded()),
        ] {
            let best = out.last().unwrap();
            assert_eq!(best.score, 14.0);
            assert_eq!(score_tour(&best.tour, &m), 14.0);
        }
    }

    #[test]
    fn test_improves_on_greedy_seed() {
        let m = greedy_trap();
        let greedy = greedy_tour(&m, &Timer::unbounded());
        assert_eq!(greedy.last().unwrap().tour, vec![1, 2, 3, 4, 0]);
        assert_eq!(greedy.last().unwrap().score, 30.0);

        for out in [
            branch_and_bound(&m, &Timer::unbounded()),
            branch_and_bound_smart(&m, &Timer::unbounded()),
        ] {
            assert_eq!(out.len(), 2);
            assert_eq!(out[0].score, 30.0);
            assert_eq!(out[1].score, 17.0);
            assert_eq!(out[1].tour, vec![0, 2, 1, 3, 4]);
            assert!(out[1].n_nodes_pruned > 0);
        }
    }

    #[test]
    fn test_smart_bound_prunes_more() {
        let m = greedy_trap();
        let plain = branch_and_bound(&m, &Timer::unbounded());
        let smart = branch_and_bound_smart(&m, &Timer::unbounded());
        assert!(
            smart.last().unwrap().n_nodes_expanded < plain.last().unwrap().n_nodes_expanded
        );
    }

    #[test]
    fn test_unreachable_node_cuts_everything() {
        let m = CostMatrix::new(vec![
            vec![INF, 1.0, 2.0, INF],
            vec![1.0, INF, 4.0, INF],
            vec![2.0, 4.0, INF, INF],
            vec![INF, INF, INF, INF],
        ])
        .unwrap();
        for out in [
            branch_and_bound(&m, &Timer::unbounded()),
            branch_and_bound_smart(&m, &Timer::unbounded()),
        ] {
            assert_eq!(out.len(), 1);
            assert!(out[0].is_sentinel());
            assert_eq!(out[0].n_nodes_expanded, 1);
        }
    }

    #[test]
    fn test_expired_budget_skips_seed() {
        let out = branch_and_bound(&four_node(), &StepBudget::new(0));
        assert_eq!(out.len(), 1);
        assert!(out[0].is_sentinel());
        assert_eq!(out[0].n_nodes_expanded, 1);
    }

    fn random_matrix(n: usize, density: f64, seed: u64) -> CostMatrix {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        CostMatrix::random(n, density, &mut StdRng::seed_from_u64(seed))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Every cut has a bound at or above the incumbent, and no cut
        /// discards a completion cheaper than that incumbent.
        #[test]
        fn prop_cuts_are_sound(
            n in 3_usize..7,
            density in 0.5_f64..1.0,
            seed in any::<u64>(),
        ) {
            let m = random_matrix(n, density, seed);
            for smart in [false, true] {
                CUT_LOG.with(|log| log.borrow_mut().clear());
                if smart {
                    branch_and_bound_smart(&m, &Timer::unbounded());
                } else {
                    branch_and_bound(&m, &Timer::unbounded());
                }
                let cuts = CUT_LOG.with(|log| log.take());
                for (tour, bound, incumbent) in cuts {
                    prop_assert!(bound >= incumbent);
                    let completion = best_completion(&m, &tour);
                    prop_assert!(bound <= completion, "bound {} > completion {} for {:?}", bound, completion, tour);
                    prop_assert!(completion >= incumbent);
                }
            }
        }

        /// The bound that drives the search agrees with the public
        /// [`lower_bound`] on every prefix.
        #[test]
        fn prop_search_bound_is_lower_bound(
            n in 2_usize..7,
            seed in any::<u64>(),
            len in 1_usize..7,
        ) {
            let m = random_matrix(n, 1.0, seed);
            let model = CheapestEdge::new(&m);
            let (_, extra) = model.root(&m);
            let root = Node { bound: 0.0, seq: 0, tour: vec![0], cost: 0.0, extra };
            let prefix: Vec<usize> = (0..len.min(n)).collect();
            let cost: f64 = prefix.windows(2).map(|w| m.cost(w[0], w[1])).sum();
            let (bound, ()) = model.child(&m, &root, prefix[prefix.len() - 1], &prefix, cost);
            prop_assert_eq!(bound, lower_bound(&m, &prefix));
        }

        /// The per-node bound never exceeds the best completion.
        #[test]
        fn prop_lower_bound_admissible(
            n in 2_usize..7,
            seed in any::<u64>(),
            len in 1_usize..7,
        ) {
            let m = random_matrix(n, 0.8, seed);
            let prefix: Vec<usize> = (0..len.min(n)).collect();
            prop_assert!(lower_bound(&m, &prefix) <= best_completion(&m, &prefix));
        }

        #[test]
        fn prop_smart_matches_dfs(n in 2_usize..8, seed in any::<u64>()) {
            let m = random_matrix(n, 0.7, seed);
            let exact = dfs(&m, &Timer::unbounded()).last().unwrap().score;
            let smart = branch_and_bound_smart(&m, &Timer::unbounded()).last().unwrap().score;
            prop_assert_eq!(smart, exact);
        }
    }
}
