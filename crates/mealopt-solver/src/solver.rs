use std::time::{Duration, Instant};

use crate::branch::BranchAndBound;
use crate::config::{PivotRule, SolverConfig};
use crate::problem::Model;
use crate::simplex::{Relaxation, Simplex};
use crate::solution::{Solution, SolutionStatus, SolveStats};

/// Mixed-integer solver: branch-and-bound over a two-phase simplex
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.config.tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.config.pivot_rule = rule;
        self
    }

    pub fn with_node_limit(mut self, nodes: usize) -> Self {
        self.config.node_limit = Some(nodes);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit = Some(limit);
        self
    }

    /// Solve the model, honouring integrality
    pub fn solve(&self, model: &Model) -> Solution {
        BranchAndBound::new(&self.config).solve(model)
    }

    /// Solve the continuous relaxation: integrality flags are ignored
    pub fn solve_relaxation(&self, model: &Model) -> Solution {
        let start = Instant::now();
        let lower: Vec<f64> = model.variables().iter().map(|v| v.lower).collect();
        let upper: Vec<f64> = model.variables().iter().map(|v| v.upper).collect();

        let result = Simplex::new(&self.config).solve(model, &lower, &upper);
        let stats = SolveStats {
            nodes: 1,
            iterations: result.iterations,
            elapsed: start.elapsed(),
            ..SolveStats::default()
        };

        let solution = match result.outcome {
            Relaxation::Optimal { values, objective } => {
                Solution::with_values(SolutionStatus::Optimal, model, &values, objective)
            }
            Relaxation::Infeasible => Solution::infeasible(),
            Relaxation::Unbounded => Solution::unbounded(),
            Relaxation::Failed(failure) => Solution::infeasible()
                .with_diagnostics(vec![format!("relaxation treated as infeasible: {failure}")]),
        };
        solution.with_stats(stats)
    }
}
