//! Cost matrix and tour scoring.
//!
//! Costs are `f64` and an absent edge is [`f64::INFINITY`], which compares
//! greater than every finite cost and survives addition. A tour is a
//! sequence of node indices read as a cycle: the closing edge from the last
//! node back to the first is always part of its cost.

use crate::error::{Result, TspError};
use rand::Rng;

/// A square, possibly asymmetric table of edge costs.
///
/// The diagonal is never traversed; whatever is stored there is ignored.
///
/// # Examples
///
/// ```
/// use tsp_anytime::matrix::{score_tour, CostMatrix};
///
/// let inf = f64::INFINITY;
/// let m = CostMatrix::new(vec![
///     vec![inf, 1.0, 2.0],
///     vec![3.0, inf, 4.0],
///     vec![5.0, 6.0, inf],
/// ])
/// .unwrap();
///
/// assert_eq!(m.len(), 3);
/// assert_eq!(score_tour(&[0, 1, 2], &m), 1.0 + 4.0 + 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: Vec<Vec<f64>>,
}

impl CostMatrix {
    /// Builds a matrix from rows, rejecting non-square input, negative
    /// costs and NaN.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TspError::NotSquare {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, &value) in row.iter().enumerate() {
                if i == j {
                    continue;
                }
                if value.is_nan() {
                    return Err(TspError::NanCost { row: i, col: j });
                }
                if value < 0.0 {
                    return Err(TspError::NegativeCost {
                        row: i,
                        col: j,
                        value,
                    });
                }
            }
        }
        Ok(Self { rows })
    }

    /// Generates a random matrix with integer costs in `1..=100`.
    ///
    /// Each off-diagonal edge is present with probability `density`
    /// (clamped to `[0, 1]`); absent edges and the diagonal are infinite.
    pub fn random<R: Rng + ?Sized>(n: usize, density: f64, rng: &mut R) -> Self {
        let density = density.clamp(0.0, 1.0);
        let rows = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i != j && rng.random_bool(density) {
                            rng.random_range(1..=100) as f64
                        } else {
                            f64::INFINITY
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cost of the edge `from -> to`.
    ///
    /// # Panics
    /// Panics if either index is out of range.
    pub fn cost(&self, from: usize, to: usize) -> f64 {
        self.rows[from][to]
    }

    /// Whether `from -> to` is a finite, non-loop edge.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        from != to && self.cost(from, to).is_finite()
    }

    /// Cost of closing a tour from `last` back to `first`.
    ///
    /// A one-node graph closes for free: the tour `[0]` is a cycle with no
    /// edges.
    pub fn closing_cost(&self, last: usize, first: usize) -> f64 {
        if self.len() == 1 {
            0.0
        } else if last == first {
            f64::INFINITY
        } else {
            self.cost(last, first)
        }
    }

    /// Cheapest edge leaving `from` towards any other node, or infinity if
    /// `from` has no outgoing edge.
    pub fn min_outgoing(&self, from: usize) -> f64 {
        self.rows[from]
            .iter()
            .enumerate()
            .filter(|&(to, _)| to != from)
            .map(|(_, &c)| c)
            .fold(f64::INFINITY, f64::min)
    }

    /// Raw rows, diagonal included.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Row-major copy with the diagonal forced to infinity.
    pub(crate) fn to_flat(&self) -> Vec<f64> {
        let n = self.len();
        let mut flat = Vec::with_capacity(n * n);
        for (i, row) in self.rows.iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                flat.push(if i == j { f64::INFINITY } else { c });
            }
        }
        flat
    }
}

impl TryFrom<Vec<Vec<f64>>> for CostMatrix {
    type Error = TspError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

/// Total cost of `tour` read as a cycle.
///
/// Returns infinity if any edge along the tour, including the closing edge,
/// is absent. The empty tour is infinite; a single node costs nothing.
pub fn score_tour(tour: &[usize], matrix: &CostMatrix) -> f64 {
    let (Some(&first), Some(&last)) = (tour.first(), tour.last()) else {
        return f64::INFINITY;
    };
    if tour.len() == 1 {
        return 0.0;
    }
    let mut total = 0.0;
    for w in tour.windows(2) {
        if w[0] == w[1] {
            return f64::INFINITY;
        }
        total += matrix.cost(w[0], w[1]);
    }
    total + matrix.closing_cost(last, first)
}

/// Row-then-column reduction of the matrix.
///
/// Every row, then every column, has its smallest finite entry subtracted
/// from it. Rows and columns with no finite entry are left as they are.
/// Returns the reduced rows (diagonal set to infinity) together with the
/// sum of all subtracted minima, which is a lower bound on any tour.
pub fn reduce_cost_matrix(matrix: &CostMatrix) -> (Vec<Vec<f64>>, f64) {
    let n = matrix.len();
    let mut flat = matrix.to_flat();
    let total = reduce_flat(&mut flat, n);
    let rows = if n == 0 {
        Vec::new()
    } else {
        flat.chunks(n).map(<[f64]>::to_vec).collect()
    };
    (rows, total)
}

/// In-place reduction of a row-major `n x n` matrix; see
/// [`reduce_cost_matrix`].
pub(crate) fn reduce_flat(costs: &mut [f64], n: usize) -> f64 {
    let mut total = 0.0;

    for i in 0..n {
        let row = &mut costs[i * n..(i + 1) * n];
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        if min.is_finite() && min > 0.0 {
            row.iter_mut().for_each(|c| *c -= min);
            total += min;
        }
    }

    for j in 0..n {
        let min = (0..n)
            .map(|i| costs[i * n + j])
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() && min > 0.0 {
            for i in 0..n {
                costs[i * n + j] -= min;
            }
            total += min;
        }
    }

    total
}
