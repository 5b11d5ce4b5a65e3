use std::time::Instant;

use crate::config::SolverConfig;
use crate::problem::{Model, Sense};
use crate::simplex::{Relaxation, Simplex};
use crate::solution::{Solution, SolutionStatus, SolveStats};

/// Node budget for the integer feasibility search behind an unbounded
/// relaxation when no node limit is configured
const FEASIBILITY_NODE_LIMIT: usize = 10_000;

/// One subproblem: the model with tightened variable bounds
#[derive(Debug, Clone)]
struct SearchNode {
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Parent's relaxation objective in minimize form
    bound: f64,
    depth: usize,
}

/// Best integer-feasible point found so far
struct Incumbent {
    values: Vec<f64>,
    /// Objective in minimize form
    bound: f64,
}

/// Depth-first branch-and-bound over the integer variables of a model
pub(crate) struct BranchAndBound<'a> {
    config: &'a SolverConfig,
}

impl<'a> BranchAndBound<'a> {
    pub fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    pub fn solve(&self, model: &Model) -> Solution {
        let start = Instant::now();
        let simplex = Simplex::new(self.config);
        let sign = match model.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        let integers: Vec<usize> = model
            .variables()
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_integer())
            .map(|(j, _)| j)
            .collect();

        let mut frontier = vec![SearchNode {
            lower: model.variables().iter().map(|v| v.lower).collect(),
            upper: model.variables().iter().map(|v| v.upper).collect(),
            bound: f64::NEG_INFINITY,
            depth: 0,
        }];
        let mut incumbent: Option<Incumbent> = None;
        let mut stats = SolveStats::default();
        let mut diagnostics = Vec::new();
        let mut limit_reached = None;

        while let Some(node) = frontier.pop() {
            if let Some(reason) = self.check_limits(&stats, start) {
                limit_reached = Some(reason);
                break;
            }

            if let Some(best) = &incumbent {
                if self.dominated(node.bound, best.bound) {
                    stats.pruned += 1;
                    continue;
                }
            }

            let result = simplex.solve(model, &node.lower, &node.upper);
            stats.nodes += 1;
            stats.iterations += result.iterations;
            stats.max_depth = stats.max_depth.max(node.depth);

            let (mut values, objective) = match result.outcome {
                Relaxation::Optimal { values, objective } => (values, objective),
                Relaxation::Infeasible => continue,
                Relaxation::Failed(failure) => {
                    tracing::warn!(
                        component = "branch_and_bound",
                        operation = "solve_node",
                        depth = node.depth,
                        %failure,
                        "Discarding node after numerical failure"
                    );
                    diagnostics.push(format!(
                        "node {} at depth {} discarded: {}",
                        stats.nodes, node.depth, failure
                    ));
                    continue;
                }
                Relaxation::Unbounded => {
                    tracing::info!(
                        component = "branch_and_bound",
                        operation = "solve",
                        model = model.name(),
                        depth = node.depth,
                        "Relaxation is unbounded"
                    );
                    // An unbounded relaxation only makes the model unbounded
                    // when some integer point is feasible
                    let solution = if integers.is_empty() {
                        Solution::unbounded()
                    } else {
                        let witness = self.find_integer_point(model, &node, start);
                        stats.nodes += witness.stats.nodes;
                        stats.pruned += witness.stats.pruned;
                        stats.iterations += witness.stats.iterations;
                        stats.max_depth = stats.max_depth.max(node.depth + witness.stats.max_depth);
                        diagnostics.extend(witness.diagnostics);
                        if witness.status.has_solution() {
                            Solution::unbounded()
                        } else {
                            diagnostics.push(
                                "relaxation is unbounded but no integer point was found".to_string(),
                            );
                            Solution::infeasible()
                        }
                    };
                    stats.elapsed = start.elapsed();
                    return solution.with_stats(stats).with_diagnostics(diagnostics);
                }
            };
            let bound = sign * objective;

            if let Some(best) = &incumbent {
                if self.dominated(bound, best.bound) {
                    stats.pruned += 1;
                    continue;
                }
            }

            match self.select_branch_variable(&integers, &values) {
                None => {
                    for &j in &integers {
                        values[j] = values[j].round();
                    }
                    let bound = sign * model.objective_value(&values);
                    let improves = incumbent
                        .as_ref()
                        .is_none_or(|best| bound < best.bound - self.gap_tolerance(best.bound));
                    if improves {
                        tracing::debug!(
                            component = "branch_and_bound",
                            operation = "incumbent",
                            objective = sign * bound,
                            depth = node.depth,
                            nodes = stats.nodes,
                            "New incumbent"
                        );
                        incumbent = Some(Incumbent { values, bound });
                    }
                }
                Some(j) => {
                    let value = values[j];
                    let (floor, ceil) = (value.floor(), value.ceil());

                    if ceil <= node.upper[j] {
                        let mut lower = node.lower.clone();
                        lower[j] = ceil;
                        frontier.push(SearchNode {
                            lower,
                            upper: node.upper.clone(),
                            bound,
                            depth: node.depth + 1,
                        });
                    }
                    if floor >= node.lower[j] {
                        let mut upper = node.upper;
                        upper[j] = floor;
                        frontier.push(SearchNode {
                            lower: node.lower,
                            upper,
                            bound,
                            depth: node.depth + 1,
                        });
                    }
                }
            }
        }

        stats.elapsed = start.elapsed();
        let solution = match (incumbent, &limit_reached) {
            (Some(best), None) => Solution::with_values(
                SolutionStatus::Optimal,
                model,
                &best.values,
                model.objective_value(&best.values),
            ),
            (Some(best), Some(_)) => Solution::with_values(
                SolutionStatus::Suboptimal,
                model,
                &best.values,
                model.objective_value(&best.values),
            ),
            (None, _) => Solution::infeasible(),
        };
        if let Some(reason) = limit_reached {
            diagnostics.push(reason);
        }

        tracing::info!(
            component = "branch_and_bound",
            operation = "solve",
            model = model.name(),
            status = %solution.status,
            nodes = stats.nodes,
            pruned = stats.pruned,
            iterations = stats.iterations,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "Search finished"
        );

        solution.with_stats(stats).with_diagnostics(diagnostics)
    }

    /// Search the node's region for any integer-feasible point.
    ///
    /// The objective is dropped, so no relaxation in this search is
    /// unbounded. The region itself may be, so the search runs under the
    /// caller's node limit (or [`FEASIBILITY_NODE_LIMIT`]) and whatever
    /// remains of the time limit.
    fn find_integer_point(&self, model: &Model, node: &SearchNode, start: Instant) -> Solution {
        let mut restricted = model.clone();
        restricted.objective = vec![0.0; model.num_variables()];
        for (var, (&lower, &upper)) in restricted
            .variables
            .iter_mut()
            .zip(node.lower.iter().zip(&node.upper))
        {
            var.lower = lower;
            var.upper = upper;
        }

        let mut config = self.config.clone();
        config.node_limit = Some(config.node_limit.unwrap_or(FEASIBILITY_NODE_LIMIT));
        config.time_limit = config.time_limit.map(|limit| limit.saturating_sub(start.elapsed()));
        BranchAndBound::new(&config).solve(&restricted)
    }

    /// Most fractional integer variable; ties go to the lowest index
    fn select_branch_variable(&self, integers: &[usize], values: &[f64]) -> Option<usize> {
        let tol = self.config.tolerance;
        let mut best: Option<(usize, f64)> = None;
        for &j in integers {
            let v = values[j];
            if (v - v.round()).abs() <= tol {
                continue;
            }
            let distance = (v - v.floor() - 0.5).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((j, distance));
            }
        }
        best.map(|(j, _)| j)
    }

    /// A bound no better than the incumbent cannot lead to an improvement
    fn dominated(&self, bound: f64, incumbent: f64) -> bool {
        bound >= incumbent - self.gap_tolerance(incumbent)
    }

    fn gap_tolerance(&self, incumbent: f64) -> f64 {
        self.config.tolerance * incumbent.abs().max(1.0)
    }

    fn check_limits(&self, stats: &SolveStats, start: Instant) -> Option<String> {
        if let Some(limit) = self.config.node_limit {
            if stats.nodes >= limit {
                return Some(format!("node limit of {limit} reached"));
            }
        }
        if let Some(limit) = self.config.time_limit {
            if start.elapsed() >= limit {
                return Some(format!("time limit of {:?} reached", limit));
            }
        }
        None
    }
}
