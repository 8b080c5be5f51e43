//! Cut-coverage bookkeeping.
//!
//! [`CutTree`] records abandoned tour prefixes and estimates how much of the
//! permutation space they eliminate. A prefix of length `k` out of `n` nodes
//! stands for `(n - k)!` leaves, which is `1 / (n (n-1) ... (n-k+1))` of the
//! whole space.
//!
//! The numbers are for progress display only. Nothing in the searches reads
//! them back.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct CutNode {
    cut: bool,
    /// Leaves eliminated somewhere in this subtree, saturating at
    /// `f64::MAX`.
    leaves: f64,
    /// Share of all leaves eliminated somewhere in this subtree.
    fraction: f64,
    children: HashMap<usize, CutNode>,
}

/// Per-depth weights of a cut prefix.
#[derive(Debug)]
struct Weights {
    /// `(n - k)!`, saturating at `f64::MAX`.
    leaves: Vec<f64>,
    /// `(n - k)! / n!`, built as a running product of ratios so it stays
    /// finite for any `n`.
    fraction: Vec<f64>,
}

/// Change in a subtree's totals caused by one cut.
#[derive(Debug, Clone, Copy, Default)]
struct Delta {
    leaves: f64,
    fraction: f64,
}

/// Prefix trie of abandoned partial tours.
///
/// Cutting a prefix already covered by a cut ancestor changes nothing, and
/// cutting an ancestor absorbs the cuts beneath it, so no leaf is counted
/// twice.
///
/// # Examples
///
/// ```
/// use tsp_anytime::coverage::CutTree;
///
/// let mut tree = CutTree::new(4);
/// tree.cut(&[0, 1]);
/// tree.cut(&[0, 1, 2]);
/// assert_eq!(tree.n_leaves_cut(), 2.0);
/// assert!((tree.fraction_leaves_covered() - 2.0 / 24.0).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct CutTree {
    n: usize,
    weights: Weights,
    root: CutNode,
}

impl CutTree {
    /// Creates an empty tree over permutations of `n` nodes.
    pub fn new(n: usize) -> Self {
        let mut leaves = vec![1.0; n + 1];
        for k in (0..n).rev() {
            leaves[k] = (leaves[k + 1] * (n - k) as f64).min(f64::MAX);
        }
        let mut fraction = vec![1.0; n + 1];
        for k in 1..=n {
            fraction[k] = fraction[k - 1] / (n - k + 1) as f64;
        }
        Self {
            n,
            weights: Weights { leaves, fraction },
            root: CutNode::default(),
        }
    }

    /// Marks every completion of `prefix` as eliminated.
    ///
    /// Prefixes longer than `n` are treated as complete tours.
    pub fn cut(&mut self, prefix: &[usize]) {
        let prefix = &prefix[..prefix.len().min(self.n)];
        insert(&mut self.root, prefix, 0, &self.weights);
    }

    /// Number of leaves eliminated so far, saturating at `f64::MAX`.
    pub fn n_leaves_cut(&self) -> f64 {
        self.root.leaves
    }

    /// Share of the `n!` leaves eliminated so far, in `[0, 1]`.
    pub fn fraction_leaves_covered(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        self.root.fraction.clamp(0.0, 1.0)
    }
}

/// Returns what the cut newly covers below `node`.
fn insert(node: &mut CutNode, prefix: &[usize], depth: usize, weights: &Weights) -> Delta {
    if node.cut {
        return Delta::default();
    }
    match prefix.split_first() {
        None => {
            let leaves = weights.leaves[depth];
            let fraction = weights.fraction[depth];
            let delta = Delta {
                leaves: (leaves - node.leaves).max(0.0),
                fraction: (fraction - node.fraction).max(0.0),
            };
            node.cut = true;
            node.leaves = leaves;
            node.fraction = fraction;
            node.children.clear();
            delta
        }
        Some((&head, rest)) => {
            let child = node.children.entry(head).or_default();
            let delta = insert(child, rest, depth + 1, weights);
            node.leaves = (node.leaves + delta.leaves).min(f64::MAX);
            node.fraction += delta.fraction;
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let tree = CutTree::new(5);
        assert_eq!(tree.n_leaves_cut(), 0.0);
        assert_eq!(tree.fraction_leaves_covered(), 0.0);
    }

    #[test]
    fn test_prefix_weight_is_remaining_factorial() {
        let mut tree = CutTree::new(5);
        tree.cut(&[0]);
        assert_eq!(tree.n_leaves_cut(), 24.0);
        tree.cut(&[1, 2, 3, 4, 0]);
        assert_eq!(tree.n_leaves_cut(), 25.0);
    }

    #[test]
    fn test_duplicate_cut_not_double_counted() {
        let mut tree = CutTree::new(4);
        tree.cut(&[0, 1, 2, 3]);
        tree.cut(&[0, 1, 2, 3]);
        assert_eq!(tree.n_leaves_cut(), 1.0);
    }

    #[test]
    fn test_ancestor_absorbs_descendants() {
        let mut tree = CutTree::new(4);
        tree.cut(&[0, 1, 2]);
        tree.cut(&[0, 2, 1]);
        assert_eq!(tree.n_leaves_cut(), 2.0);
        tree.cut(&[0]);
        assert_eq!(tree.n_leaves_cut(), 6.0);
        tree.cut(&[0, 3]);
        assert_eq!(tree.n_leaves_cut(), 6.0);
    }

    #[test]
    fn test_fraction_is_monotone_and_bounded() {
        let mut tree = CutTree::new(3);
        let mut last = 0.0;
        for prefix in [&[0, 1][..], &[0][..], &[1, 0, 2][..], &[1][..], &[2][..]] {
            tree.cut(prefix);
            let f = tree.fraction_leaves_covered();
            assert!(f >= last);
            last = f;
        }
        assert!((last - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_large_n_stays_finite() {
        let mut tree = CutTree::new(200);
        tree.cut(&[0, 5]);
        let after_deep = tree.fraction_leaves_covered();
        assert!((after_deep - 1.0 / (200.0 * 199.0)).abs() < 1e-15);
        assert!(tree.n_leaves_cut().is_finite());

        tree.cut(&[0]);
        let after_shallow = tree.fraction_leaves_covered();
        assert!((after_shallow - 1.0 / 200.0).abs() < 1e-15);
        assert!(after_shallow > after_deep);
        assert!(!tree.n_leaves_cut().is_nan());
        assert!(tree.n_leaves_cut().is_finite());

        tree.cut(&[1]);
        assert!((tree.fraction_leaves_covered() - 2.0 / 200.0).abs() < 1e-15);
    }

    #[test]
    fn test_zero_nodes() {
        let mut tree = CutTree::new(0);
        tree.cut(&[]);
        assert_eq!(tree.fraction_leaves_covered(), 0.0);
    }
}
