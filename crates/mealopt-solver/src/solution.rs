use std::time::Duration;

use crate::problem::Model;

/// The result of solving a model
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Objective value, present iff the status carries a solution
    pub objective_value: Option<f64>,
    /// Variable values, present iff the status carries a solution
    pub assignment: Option<Assignment>,
    pub stats: SolveStats,
    /// Warnings recorded during the solve
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// A search limit stopped the solve; the best solution found is reported
    Suboptimal,
}

impl SolutionStatus {
    /// Whether the status carries an objective value and assignment
    pub fn has_solution(self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Suboptimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Suboptimal => "suboptimal",
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variable values keyed by name, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    entries: Vec<(String, f64)>,
}

impl Assignment {
    pub(crate) fn from_values(model: &Model, values: &[f64]) -> Self {
        Self {
            entries: model
                .variables()
                .iter()
                .zip(values)
                .map(|(v, &x)| (v.name.clone(), x))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, x)| x)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, x)| (n.as_str(), *x))
    }

    /// Values in column order
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|&(_, x)| x).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Assignment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Work counters for one solve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolveStats {
    /// Branch-and-bound nodes whose relaxation was solved
    pub nodes: usize,
    /// Nodes discarded by bound
    pub pruned: usize,
    /// Simplex pivots over all relaxations
    pub iterations: usize,
    /// Deepest node explored
    pub max_depth: usize,
    pub elapsed: Duration,
}

impl Solution {
    pub(crate) fn with_values(
        status: SolutionStatus,
        model: &Model,
        values: &[f64],
        objective_value: f64,
    ) -> Self {
        Self {
            status,
            objective_value: Some(objective_value),
            assignment: Some(Assignment::from_values(model, values)),
            stats: SolveStats::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn infeasible() -> Self {
        Self::without_values(SolutionStatus::Infeasible)
    }

    pub fn unbounded() -> Self {
        Self::without_values(SolutionStatus::Unbounded)
    }

    fn without_values(status: SolutionStatus) -> Self {
        Self {
            status,
            objective_value: None,
            assignment: None,
            stats: SolveStats::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    /// Value of a variable, if the solve produced an assignment
    pub fn value(&self, name: &str) -> Option<f64> {
        self.assignment.as_ref().and_then(|a| a.get(name))
    }

    pub(crate) fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub(crate) fn with_stats(mut self, stats: SolveStats) -> Self {
        self.stats = stats;
        self
    }
}
