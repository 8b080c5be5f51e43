//! Solve configuration.
//!
//! [`SolveConfig`] selects a [`Strategy`] and its time budget.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TspError};

/// Which search to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Uniformly random permutations. Runs until the budget expires.
    Random,
    /// Nearest-neighbor construction from every start node.
    Greedy,
    /// Exhaustive depth-first enumeration.
    Dfs,
    /// Best-first branch-and-bound with the per-node cheapest-edge bound.
    #[default]
    BranchAndBound,
    /// Best-first branch-and-bound with the reduced-matrix bound.
    BranchAndBoundSmart,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Random,
        Strategy::Greedy,
        Strategy::Dfs,
        Strategy::BranchAndBound,
        Strategy::BranchAndBoundSmart,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::Greedy => "greedy",
            Strategy::Dfs => "dfs",
            Strategy::BranchAndBound => "branch_and_bound",
            Strategy::BranchAndBoundSmart => "branch_and_bound_smart",
        }
    }

    /// Whether the search ends on its own when given unlimited time.
    pub fn terminates(self) -> bool {
        !matches!(self, Strategy::Random)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = TspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "greedy" => Ok(Strategy::Greedy),
            "dfs" => Ok(Strategy::Dfs),
            "bnb" | "branch_and_bound" => Ok(Strategy::BranchAndBound),
            "bnb_smart" | "branch_and_bound_smart" => Ok(Strategy::BranchAndBoundSmart),
            other => Err(TspError::InvalidConfig(format!("unknown strategy '{other}'"))),
        }
    }
}

/// Configuration for a single solve.
///
/// # Examples
///
/// ```
/// use tsp_anytime::config::{SolveConfig, Strategy};
///
/// let config = SolveConfig::default()
///     .with_strategy(Strategy::Dfs)
///     .with_time_limit_ms(500);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveConfig {
    /// Search to run.
    pub strategy: Strategy,

    /// Optional wall-clock time limit in milliseconds.
    ///
    /// The limit is checked once per loop iteration, so a run may overshoot
    /// it by the cost of one expansion. `None` runs until the search ends on
    /// its own, which [`Strategy::Random`] never does.
    pub time_limit_ms: Option<u64>,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed. Only [`Strategy::Random`] draws numbers.
    pub seed: Option<u64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            time_limit_ms: Some(60_000),
            seed: None,
        }
    }
}

impl SolveConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the wall-clock time limit in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.time_limit_ms == Some(0) {
            return Err(TspError::InvalidConfig(
                "time_limit_ms must be positive or None".into(),
            ));
        }
        if self.time_limit_ms.is_none() && !self.strategy.terminates() {
            return Err(TspError::InvalidConfig(format!(
                "strategy '{}' needs a time limit",
                self.strategy
            )));
        }
        Ok(())
    }
}
