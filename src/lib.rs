//! Anytime solvers for the asymmetric Traveling Salesperson Problem.
//!
//! Given a square cost matrix, where [`f64::INFINITY`] marks an absent edge,
//! and a time budget, each strategy reports the improving sequence of tours
//! it found together with search-effort statistics:
//!
//! - **Random sampling**: uniformly random permutations, kept when they
//!   improve.
//! - **Greedy**: nearest-neighbor construction from every start node.
//! - **Depth-first search**: exhaustive enumeration, pruned only against the
//!   incumbent.
//! - **Branch-and-bound**: best-first search with an admissible lower bound,
//!   seeded with the greedy tour. A second variant uses a reduced-matrix
//!   bound.
//!
//! Every run returns at least one [`SolutionStats`](stats::SolutionStats);
//! when no feasible tour is found in time it is a sentinel with an infinite
//! score. The last record is always the best.
//!
//! # Examples
//!
//! ```
//! use tsp_anytime::config::{SolveConfig, Strategy};
//! use tsp_anytime::matrix::CostMatrix;
//! use tsp_anytime::solver::solve;
//!
//! let inf = f64::INFINITY;
//! let matrix = CostMatrix::new(vec![
//!     vec![inf, 3.0, 1.0],
//!     vec![1.0, inf, 3.0],
//!     vec![3.0, 1.0, inf],
//! ])
//! .unwrap();
//!
//! let config = SolveConfig::default()
//!     .with_strategy(Strategy::BranchAndBound)
//!     .with_time_limit_ms(1_000);
//! let records = solve(&matrix, &config).unwrap();
//! assert_eq!(records.last().unwrap().score, 3.0);
//! ```
//!
//! # Architecture
//!
//! Single-threaded and cooperative: each search polls its
//! [`Deadline`](timer::Deadline) once per loop iteration and owns its own
//! frontier and counters. The matrix is only ever borrowed.

pub mod config;
pub mod coverage;
pub mod error;
pub mod matrix;
pub mod solver;
pub mod stats;
pub mod timer;

pub use error::{Result, TspError};
