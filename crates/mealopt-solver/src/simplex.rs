use std::fmt;

use crate::config::{PivotRule, SolverConfig};
use crate::error::PivotError;
use crate::linalg::Matrix;
use crate::problem::{ConstraintOp, Model, Sense};

/// Outcome of one LP relaxation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Relaxation {
    /// Optimal vertex. `objective` is in the model's own sense.
    Optimal { values: Vec<f64>, objective: f64 },
    Infeasible,
    Unbounded,
    /// The engine gave up on numerical grounds
    Failed(LpFailure),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum LpFailure {
    Degenerate(PivotError),
    IterationLimit { phase: u8, iterations: usize },
}

impl fmt::Display for LpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpFailure::Degenerate(err) => write!(f, "no usable pivot: {err}"),
            LpFailure::IterationLimit { phase, iterations } => {
                write!(f, "phase {phase} stopped after {iterations} iterations")
            }
        }
    }
}

/// A relaxation result plus the pivots it took
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelaxationResult {
    pub outcome: Relaxation,
    pub iterations: usize,
}

/// How a model variable maps onto non-negative tableau columns
#[derive(Debug, Clone, Copy)]
enum Column {
    /// `x = lower + x'`
    Shifted { col: usize, lower: f64 },
    /// `x = upper - x'`
    Mirrored { col: usize, upper: f64 },
    /// `x = x+ - x-`
    Split { pos: usize, neg: usize },
}

struct Tableau {
    /// Constraint rows followed by the cost row; the last column is the RHS
    data: Matrix,
    basic_vars: Vec<usize>,
    n_vars: usize,
    n_slack: usize,
    n_artificial: usize,
    columns: Vec<Column>,
    /// Phase 2 costs of the structural columns, minimize form
    costs: Vec<f64>,
    /// Largest absolute RHS, used to scale the phase 1 feasibility test
    rhs_scale: f64,
}

impl Tableau {
    fn n_rows(&self) -> usize {
        self.basic_vars.len()
    }

    fn obj_row(&self) -> usize {
        self.n_rows()
    }

    fn rhs_col(&self) -> usize {
        self.data.cols() - 1
    }

    fn art_start(&self) -> usize {
        self.n_vars + self.n_slack
    }
}

enum PhaseResult {
    Optimal,
    Unbounded,
}

/// Two-phase dense simplex over a model's continuous relaxation
pub(crate) struct Simplex<'a> {
    config: &'a SolverConfig,
}

impl<'a> Simplex<'a> {
    pub fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    /// Solve the relaxation of `model` with per-variable bounds overriding
    /// the model's own.
    pub fn solve(&self, model: &Model, lower: &[f64], upper: &[f64]) -> RelaxationResult {
        let tol = self.config.tolerance;
        if lower.iter().zip(upper).any(|(l, u)| *l > *u + tol) {
            return RelaxationResult {
                outcome: Relaxation::Infeasible,
                iterations: 0,
            };
        }

        let mut tableau = self.build_tableau(model, lower, upper);
        let mut iterations = 0;

        let outcome = self.run_phases(&mut tableau, &mut iterations);
        let outcome = match outcome {
            Ok(PhaseOutcome::Optimal) => {
                let values = self.extract_values(&tableau);
                let objective = model.objective_value(&values);
                Relaxation::Optimal { values, objective }
            }
            Ok(PhaseOutcome::Infeasible) => Relaxation::Infeasible,
            Ok(PhaseOutcome::Unbounded) => Relaxation::Unbounded,
            Err(failure) => {
                tracing::warn!(
                    component = "simplex",
                    operation = "solve",
                    model = model.name(),
                    %failure,
                    "Relaxation failed"
                );
                Relaxation::Failed(failure)
            }
        };

        tracing::trace!(
            component = "simplex",
            operation = "solve",
            iterations,
            rows = tableau.n_rows(),
            cols = tableau.data.cols(),
            "Relaxation finished"
        );

        RelaxationResult {
            outcome,
            iterations,
        }
    }

    fn run_phases(
        &self,
        tableau: &mut Tableau,
        iterations: &mut usize,
    ) -> Result<PhaseOutcome, LpFailure> {
        if tableau.n_artificial > 0 && !self.phase1(tableau, iterations)? {
            return Ok(PhaseOutcome::Infeasible);
        }
        match self.phase2(tableau, iterations)? {
            PhaseResult::Optimal => Ok(PhaseOutcome::Optimal),
            PhaseResult::Unbounded => Ok(PhaseOutcome::Unbounded),
        }
    }

    fn build_tableau(&self, model: &Model, lower: &[f64], upper: &[f64]) -> Tableau {
        let sign = match model.sense() {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };

        // Map every model variable onto non-negative columns
        let mut columns = Vec::with_capacity(model.num_variables());
        let mut costs = Vec::new();
        let mut bound_rows: Vec<(usize, f64)> = Vec::new();
        for (j, &c) in model.objective().iter().enumerate() {
            let (l, u) = (lower[j], upper[j]);
            let c = sign * c;
            if l.is_finite() {
                let col = costs.len();
                costs.push(c);
                if u.is_finite() {
                    bound_rows.push((col, u - l));
                }
                columns.push(Column::Shifted { col, lower: l });
            } else if u.is_finite() {
                let col = costs.len();
                costs.push(-c);
                columns.push(Column::Mirrored { col, upper: u });
            } else {
                let pos = costs.len();
                costs.push(c);
                costs.push(-c);
                columns.push(Column::Split { pos, neg: pos + 1 });
            }
        }
        let n_vars = costs.len();

        // Rows over the structural columns, RHS made non-negative
        let mut rows: Vec<(Vec<f64>, ConstraintOp, f64)> = Vec::new();
        for row in model.constraints() {
            let mut coefs = vec![0.0; n_vars];
            let mut rhs = row.rhs;
            for (&a, column) in row.coefficients.iter().zip(&columns) {
                if a == 0.0 {
                    continue;
                }
                match *column {
                    Column::Shifted { col, lower } => {
                        coefs[col] += a;
                        rhs -= a * lower;
                    }
                    Column::Mirrored { col, upper } => {
                        coefs[col] -= a;
                        rhs -= a * upper;
                    }
                    Column::Split { pos, neg } => {
                        coefs[pos] += a;
                        coefs[neg] -= a;
                    }
                }
            }
            rows.push((coefs, row.op, rhs));
        }
        for (col, width) in bound_rows {
            let mut coefs = vec![0.0; n_vars];
            coefs[col] = 1.0;
            rows.push((coefs, ConstraintOp::Le, width));
        }
        for (coefs, op, rhs) in rows.iter_mut() {
            if *rhs < 0.0 {
                *rhs = -*rhs;
                coefs.iter_mut().for_each(|a| *a = -*a);
                *op = match *op {
                    ConstraintOp::Le => ConstraintOp::Ge,
                    ConstraintOp::Ge => ConstraintOp::Le,
                    ConstraintOp::Eq => ConstraintOp::Eq,
                };
            }
        }

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for (_, op, _) in &rows {
            match op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let n_rows = rows.len();
        let total_cols = n_vars + n_slack + n_artificial + 1; // +1 for RHS
        let mut data = Matrix::zeros(n_rows + 1, total_cols);
        let mut basic_vars = vec![0; n_rows];
        let mut rhs_scale: f64 = 0.0;

        let mut slack_idx = n_vars;
        let mut artificial_idx = n_vars + n_slack;
        for (i, (coefs, op, rhs)) in rows.into_iter().enumerate() {
            data.row_mut(i)[..n_vars].copy_from_slice(&coefs);
            data.set(i, total_cols - 1, rhs);
            rhs_scale = rhs_scale.max(rhs);

            match op {
                ConstraintOp::Le => {
                    data.set(i, slack_idx, 1.0);
                    basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data.set(i, slack_idx, -1.0);
                    slack_idx += 1;
                    data.set(i, artificial_idx, 1.0);
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data.set(i, artificial_idx, 1.0);
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        Tableau {
            data,
            basic_vars,
            n_vars,
            n_slack,
            n_artificial,
            columns,
            costs,
            rhs_scale,
        }
    }

    /// Minimize the sum of artificials. Returns whether a feasible basis exists.
    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> Result<bool, LpFailure> {
        let tol = self.config.tolerance;
        let obj_row = tableau.obj_row();
        let art_start = tableau.art_start();
        let rhs_col = tableau.rhs_col();

        tableau.data.row_mut(obj_row).fill(0.0);
        for j in art_start..art_start + tableau.n_artificial {
            tableau.data.set(obj_row, j, 1.0);
        }
        // Price out the basic artificials
        for i in 0..tableau.n_rows() {
            if tableau.basic_vars[i] >= art_start {
                tableau.data.add_scaled_row(obj_row, i, -1.0);
            }
        }

        match self.iterate(tableau, rhs_col, 1, iterations)? {
            PhaseResult::Optimal => {}
            // The sum of artificials is bounded below by zero
            PhaseResult::Unbounded => {
                return Err(LpFailure::Degenerate(PivotError::NumericDegeneracy {
                    row: obj_row,
                    col: rhs_col,
                    value: tableau.data.get(obj_row, rhs_col),
                }));
            }
        }

        let infeasibility = -tableau.data.get(obj_row, rhs_col);
        if infeasibility > tol * (1.0 + tableau.rhs_scale) {
            tracing::debug!(
                component = "simplex",
                operation = "phase1",
                infeasibility,
                "No feasible basis"
            );
            return Ok(false);
        }

        self.drive_out_artificials(tableau);
        Ok(true)
    }

    /// Pivot zero-valued artificials out of the basis. Rows where no
    /// structural or slack column is available are redundant and kept as-is.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let tol = self.config.tolerance;
        let art_start = tableau.art_start();
        for i in 0..tableau.n_rows() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let candidate = (0..art_start)
                .map(|j| (j, tableau.data.get(i, j).abs()))
                .filter(|&(_, a)| a > tol)
                .max_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((col, _)) = candidate {
                if self.pivot(tableau, i, col).is_ok() {
                    continue;
                }
            }
            tracing::trace!(
                component = "simplex",
                operation = "drive_out_artificials",
                row = i,
                "Redundant row left with artificial in basis"
            );
        }
    }

    fn phase2(&self, tableau: &mut Tableau, iterations: &mut usize) -> Result<PhaseResult, LpFailure> {
        let obj_row = tableau.obj_row();

        tableau.data.row_mut(obj_row).fill(0.0);
        for (j, &c) in tableau.costs.iter().enumerate() {
            tableau.data.set(obj_row, j, c);
        }
        // Make the cost row consistent with the current basis
        for i in 0..tableau.n_rows() {
            let basic = tableau.basic_vars[i];
            let factor = tableau.data.get(obj_row, basic);
            if factor != 0.0 {
                tableau.data.add_scaled_row(obj_row, i, -factor);
            }
        }

        // Artificial columns never re-enter
        let exclude_from = tableau.art_start();
        self.iterate(tableau, exclude_from, 2, iterations)
    }

    fn iterate(
        &self,
        tableau: &mut Tableau,
        exclude_from: usize,
        phase: u8,
        iterations: &mut usize,
    ) -> Result<PhaseResult, LpFailure> {
        let obj_row = tableau.obj_row();
        let rhs_col = tableau.rhs_col();
        let mut degenerate_run = 0;

        for _ in 0..self.config.max_iterations {
            let rule = match self.config.pivot_rule {
                PivotRule::Dantzig if degenerate_run >= self.config.stall_threshold => {
                    PivotRule::Bland
                }
                rule => rule,
            };
            let candidates = self.find_pivot_columns(tableau, exclude_from, rule);
            if candidates.is_empty() {
                return Ok(PhaseResult::Optimal);
            }

            let before = tableau.data.get(obj_row, rhs_col);
            let mut last_err = None;
            let mut pivoted = false;
            for &col in &candidates {
                let Some(row) = self.find_pivot_row(tableau, col) else {
                    return Ok(PhaseResult::Unbounded);
                };
                match self.pivot(tableau, row, col) {
                    Ok(()) => {
                        pivoted = true;
                        break;
                    }
                    Err(err) => {
                        tracing::debug!(
                            component = "simplex",
                            operation = "pivot",
                            %err,
                            "Trying next entering column"
                        );
                        last_err = Some(err);
                    }
                }
            }
            if !pivoted {
                return Err(LpFailure::Degenerate(last_err.unwrap_or(
                    PivotError::NumericDegeneracy {
                        row: obj_row,
                        col: rhs_col,
                        value: 0.0,
                    },
                )));
            }
            *iterations += 1;

            let after = tableau.data.get(obj_row, rhs_col);
            if (after - before).abs() <= self.config.tolerance {
                degenerate_run += 1;
            } else {
                degenerate_run = 0;
            }
        }

        Err(LpFailure::IterationLimit {
            phase,
            iterations: self.config.max_iterations,
        })
    }

    /// Entering columns with a negative reduced cost, best first
    fn find_pivot_columns(&self, tableau: &Tableau, exclude_from: usize, rule: PivotRule) -> Vec<usize> {
        let obj_row = tableau.data.row(tableau.obj_row());
        let tol = self.config.tolerance;

        let mut candidates: Vec<usize> = (0..exclude_from).filter(|&j| obj_row[j] < -tol).collect();
        if rule == PivotRule::Dantzig {
            // Stable sort keeps the lowest index first among equal costs
            candidates.sort_by(|&a, &b| obj_row[a].total_cmp(&obj_row[b]));
        }
        candidates
    }

    /// Minimum-ratio row, ties broken by the smallest basic variable index
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let tol = self.config.tolerance;
        let rhs_col = tableau.rhs_col();

        let mut best: Option<(usize, f64)> = None;
        for i in 0..tableau.n_rows() {
            let val = tableau.data.get(i, col);
            if val <= tol {
                continue;
            }
            let ratio = tableau.data.get(i, rhs_col).max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((r, min_ratio)) => {
                    if ratio < min_ratio - tol
                        || (ratio <= min_ratio + tol && tableau.basic_vars[i] < tableau.basic_vars[r])
                    {
                        Some((i, ratio))
                    } else {
                        Some((r, min_ratio))
                    }
                }
            };
        }

        best.map(|(row, _)| row)
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) -> Result<(), PivotError> {
        tableau.data.pivot(row, col, self.config.pivot_tolerance)?;
        tableau.basic_vars[row] = col;
        Ok(())
    }

    /// Read the basic solution and undo the column substitutions
    fn extract_values(&self, tableau: &Tableau) -> Vec<f64> {
        let rhs_col = tableau.rhs_col();
        let mut shifted = vec![0.0; tableau.n_vars];
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < tableau.n_vars {
                shifted[basic] = tableau.data.get(i, rhs_col).max(0.0);
            }
        }

        tableau
            .columns
            .iter()
            .map(|column| match *column {
                Column::Shifted { col, lower } => lower + shifted[col],
                Column::Mirrored { col, upper } => upper - shifted[col],
                Column::Split { pos, neg } => shifted[pos] - shifted[neg],
            })
            .collect()
    }
}

enum PhaseOutcome {
    Optimal,
    Infeasible,
    Unbounded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{LinearExpr, Variable};
    use crate::ModelBuilder;

    fn solve(model: &Model) -> Relaxation {
        let config = SolverConfig::default();
        let lower: Vec<f64> = model.variables().iter().map(|v| v.lower).collect();
        let upper: Vec<f64> = model.variables().iter().map(|v| v.upper).collect();
        Simplex::new(&config).solve(model, &lower, &upper).outcome
    }

    fn optimal(outcome: Relaxation) -> (Vec<f64>, f64) {
        match outcome {
            Relaxation::Optimal { values, objective } => (values, objective),
            other => panic!("expected optimal, got {:?}", other),
        }
    }

    fn xy(x: Variable, y: Variable) -> ModelBuilder {
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(x).unwrap();
        builder.add_variable(y).unwrap();
        builder
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.maximize(LinearExpr::new().term("x", 3.0).term("y", 2.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).term("y", 1.0).le(4.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(3.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 1.0).le(3.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));

        assert!((values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", values[0]);
        assert!((values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", values[1]);
        assert!((objective - 11.0).abs() < 1e-6, "obj = {} (expected 11)", objective);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.minimize(LinearExpr::new().term("x", 2.0).term("y", 3.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).term("y", 1.0).ge(4.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(3.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 1.0).le(3.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));

        assert!((values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", values[0]);
        assert!((values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", values[1]);
        assert!((objective - 9.0).abs() < 1e-6, "obj = {} (expected 9)", objective);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(Variable::continuous("x")).unwrap();
        builder.minimize(LinearExpr::new().term("x", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).ge(5.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(3.0)).unwrap();

        assert_eq!(solve(&builder.build()), Relaxation::Infeasible);
    }

    #[test]
    fn test_unbounded_ray() {
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(Variable::continuous("x")).unwrap();
        builder.minimize(LinearExpr::new().term("x", -1.0)).unwrap();

        assert_eq!(solve(&builder.build()), Relaxation::Unbounded);
    }

    #[test]
    fn test_equality_constraint() {
        // min x + 2y  s.t.  x + y = 5, x <= 2  ->  x=2, y=3, obj=8
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.minimize(LinearExpr::new().term("x", 1.0).term("y", 2.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).term("y", 1.0).equals(5.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(2.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));
        assert!((values[0] - 2.0).abs() < 1e-9);
        assert!((values[1] - 3.0).abs() < 1e-9);
        assert!((objective - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_lower_bound_substitution() {
        // min x + y with x in [2, 10], y in [1.5, inf), x + y >= 1
        let mut builder = xy(
            Variable::continuous("x").with_bounds(2.0, 10.0),
            Variable::continuous("y").with_lower(1.5),
        );
        builder.minimize(LinearExpr::new().term("x", 1.0).term("y", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).term("y", 1.0).ge(1.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));
        assert_eq!(values, vec![2.0, 1.5]);
        assert!((objective - 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_upper_bound_only_and_free_variables() {
        // max x + y with x <= 4 (no lower bound), y free, y <= x - 1, y >= -10
        let mut builder = xy(
            Variable::continuous("x").with_bounds(f64::NEG_INFINITY, 4.0),
            Variable::continuous("y").free(),
        );
        builder.maximize(LinearExpr::new().term("x", 1.0).term("y", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 1.0).term("x", -1.0).le(-1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 1.0).ge(-10.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));
        assert!((values[0] - 4.0).abs() < 1e-9, "x = {}", values[0]);
        assert!((values[1] - 3.0).abs() < 1e-9, "y = {}", values[1]);
        assert!((objective - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_rhs_rows_are_flipped() {
        // min x s.t. -x <= -3  (i.e. x >= 3)
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(Variable::continuous("x")).unwrap();
        builder.minimize(LinearExpr::new().term("x", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", -1.0).le(-3.0)).unwrap();

        let (values, _) = optimal(solve(&builder.build()));
        assert!((values[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_redundant_equalities() {
        // x + y = 2 stated twice; min x  ->  x=0, y=2
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.minimize(LinearExpr::new().term("x", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).term("y", 1.0).equals(2.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 2.0).term("y", 2.0).equals(4.0)).unwrap();

        let (values, objective) = optimal(solve(&builder.build()));
        assert!(values[0].abs() < 1e-9);
        assert!((values[1] - 2.0).abs() < 1e-9);
        assert!(objective.abs() < 1e-9);
    }

    #[test]
    fn test_bland_rule_agrees_with_dantzig() {
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.maximize(LinearExpr::new().term("x", 3.0).term("y", 5.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(4.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 2.0).le(12.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 3.0).term("y", 2.0).le(18.0)).unwrap();
        let model = builder.build();

        let lower = vec![0.0, 0.0];
        let upper = vec![f64::INFINITY, f64::INFINITY];
        let bland = SolverConfig::default().with_pivot_rule(PivotRule::Bland);
        let dantzig = SolverConfig::default();

        let (_, a) = optimal(Simplex::new(&bland).solve(&model, &lower, &upper).outcome);
        let (_, b) = optimal(Simplex::new(&dantzig).solve(&model, &lower, &upper).outcome);
        assert!((a - 36.0).abs() < 1e-9);
        assert!((b - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_cycling_example_terminates() {
        // Beale's example, which cycles under the textbook rule without
        // anti-cycling. Optimum -1/20 at x = (1/25, 0, 1, 0).
        let mut builder = ModelBuilder::new("beale");
        for name in ["x1", "x2", "x3", "x4"] {
            builder.add_variable(Variable::continuous(name)).unwrap();
        }
        builder
            .minimize(
                LinearExpr::new()
                    .term("x1", -0.75)
                    .term("x2", 150.0)
                    .term("x3", -0.02)
                    .term("x4", 6.0),
            )
            .unwrap();
        builder
            .add_constraint(
                LinearExpr::new()
                    .term("x1", 0.25)
                    .term("x2", -60.0)
                    .term("x3", -0.04)
                    .term("x4", 9.0)
                    .le(0.0),
            )
            .unwrap();
        builder
            .add_constraint(
                LinearExpr::new()
                    .term("x1", 0.5)
                    .term("x2", -90.0)
                    .term("x3", -0.02)
                    .term("x4", 3.0)
                    .le(0.0),
            )
            .unwrap();
        builder.add_constraint(LinearExpr::new().term("x3", 1.0).le(1.0)).unwrap();
        let model = builder.build();

        let config = SolverConfig::default().with_stall_threshold(3).with_max_iterations(200);
        let lower = vec![0.0; 4];
        let upper = vec![f64::INFINITY; 4];
        let (_, objective) = optimal(Simplex::new(&config).solve(&model, &lower, &upper).outcome);
        assert!((objective + 0.05).abs() < 1e-9, "obj = {}", objective);
    }

    #[test]
    fn test_iteration_limit_is_reported() {
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.maximize(LinearExpr::new().term("x", 1.0).term("y", 1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 1.0).le(1.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("y", 1.0).le(1.0)).unwrap();
        let model = builder.build();

        let config = SolverConfig::default().with_max_iterations(1);
        let result = Simplex::new(&config).solve(&model, &[0.0, 0.0], &[f64::INFINITY, f64::INFINITY]);
        assert!(matches!(
            result.outcome,
            Relaxation::Failed(LpFailure::IterationLimit { phase: 2, .. })
        ));
    }

    #[test]
    fn test_rejected_pivot_moves_to_next_column() {
        // max 3x + 2y  s.t.  0.25x <= 0.25, 2x + y <= 4
        // x enters first but its ratio row has a 0.25 pivot, below the 0.5 threshold
        let mut builder = xy(Variable::continuous("x"), Variable::continuous("y"));
        builder.maximize(LinearExpr::new().term("x", 3.0).term("y", 2.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 0.25).le(0.25)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 2.0).term("y", 1.0).le(4.0)).unwrap();
        let model = builder.build();

        let config = SolverConfig::default().with_pivot_tolerance(0.5);
        let result = Simplex::new(&config).solve(&model, &[0.0, 0.0], &[f64::INFINITY, f64::INFINITY]);
        assert_eq!(result.iterations, 1);
        let (values, objective) = optimal(result.outcome);
        assert_eq!(values, vec![0.0, 4.0]);
        assert!((objective - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_usable_pivot_fails() {
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(Variable::continuous("x")).unwrap();
        builder.maximize(LinearExpr::new().term("x", 3.0)).unwrap();
        builder.add_constraint(LinearExpr::new().term("x", 0.25).le(0.25)).unwrap();
        let model = builder.build();

        let config = SolverConfig::default().with_pivot_tolerance(0.5);
        let result = Simplex::new(&config).solve(&model, &[0.0], &[f64::INFINITY]);
        assert_eq!(
            result.outcome,
            Relaxation::Failed(LpFailure::Degenerate(PivotError::NumericDegeneracy {
                row: 0,
                col: 0,
                value: 0.25,
            }))
        );
    }

    #[test]
    fn test_crossed_bounds_are_infeasible() {
        let mut builder = ModelBuilder::new("test");
        builder.add_variable(Variable::continuous("x")).unwrap();
        let model = builder.build();

        let config = SolverConfig::default();
        let result = Simplex::new(&config).solve(&model, &[3.0], &[2.0]);
        assert_eq!(result.outcome, Relaxation::Infeasible);
        assert_eq!(result.iterations, 0);
    }
}
