//! Solver configuration types.

use std::time::Duration;

use crate::linalg::EPSILON;

/// Entering-column selection policy for the simplex engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative reduced cost. Falls back to Bland's rule after a run of
    /// degenerate pivots.
    #[default]
    Dantzig,
    /// Lowest-index column with a negative reduced cost.
    Bland,
}

/// Options shared by the simplex engine and the branch-and-bound driver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Tolerance for reduced costs, ratio tests, feasibility and integrality.
    pub tolerance: f64,
    /// Smallest pivot element the simplex engine accepts. A rejected pivot
    /// makes the engine try the next entering column.
    pub pivot_tolerance: f64,
    /// Simplex iterations allowed per phase of one relaxation.
    pub max_iterations: usize,
    pub pivot_rule: PivotRule,
    /// Consecutive degenerate pivots after which Dantzig switches to Bland.
    pub stall_threshold: usize,
    /// Branch-and-bound nodes to explore. `None` means no limit.
    pub node_limit: Option<usize>,
    /// Wall-clock budget for branch-and-bound. `None` means no limit.
    pub time_limit: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            pivot_tolerance: EPSILON,
            max_iterations: 10_000,
            pivot_rule: PivotRule::default(),
            stall_threshold: 50,
            node_limit: None,
            time_limit: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_pivot_tolerance(mut self, tol: f64) -> Self {
        self.pivot_tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn with_stall_threshold(mut self, pivots: usize) -> Self {
        self.stall_threshold = pivots;
        self
    }

    pub fn with_node_limit(mut self, nodes: usize) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}
