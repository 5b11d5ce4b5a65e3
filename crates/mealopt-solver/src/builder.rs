use std::collections::{HashMap, HashSet};

use crate::error::ModelError;
use crate::problem::{
    Constraint, ConstraintOp, LinearExpr, Model, Objective, Row, Sense, VarId, Variable,
};

/// A constraint whose terms already point at column indices
#[derive(Debug, Clone)]
struct PendingRow {
    name: String,
    terms: Vec<(usize, f64)>,
    op: ConstraintOp,
    rhs: f64,
}

/// Accumulates variables, an objective and constraints into a [`Model`].
///
/// Names are resolved to column indices as soon as an expression is handed
/// over, so unknown variables are reported at the call that introduced them.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    name: String,
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    sense: Sense,
    objective: Vec<(usize, f64)>,
    rows: Vec<PendingRow>,
    row_names: HashSet<String>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Register a variable. Insertion order defines column order.
    pub fn add_variable(&mut self, variable: Variable) -> Result<VarId, ModelError> {
        if self.index.contains_key(&variable.name) {
            return Err(ModelError::DuplicateVariable(variable.name));
        }
        let (lower, upper) = (variable.lower, variable.upper);
        if lower.is_nan()
            || upper.is_nan()
            || lower > upper
            || lower == f64::INFINITY
            || upper == f64::NEG_INFINITY
        {
            return Err(ModelError::InvalidBounds {
                name: variable.name,
                lower,
                upper,
            });
        }

        let id = self.variables.len();
        self.index.insert(variable.name.clone(), id);
        self.variables.push(variable);
        Ok(VarId(id))
    }

    /// Look up a registered variable by name
    pub fn var_id(&self, name: &str) -> Option<VarId> {
        self.index.get(name).copied().map(VarId)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Replace the objective
    pub fn set_objective(&mut self, objective: Objective) -> Result<(), ModelError> {
        let terms = self.resolve(&objective.expr, "objective")?;
        self.sense = objective.sense;
        self.objective = terms;
        Ok(())
    }

    pub fn minimize(&mut self, expr: LinearExpr) -> Result<(), ModelError> {
        self.set_objective(Objective::minimize(expr))
    }

    pub fn maximize(&mut self, expr: LinearExpr) -> Result<(), ModelError> {
        self.set_objective(Objective::maximize(expr))
    }

    /// Add a constraint, returning its row index
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<usize, ModelError> {
        let row = self.rows.len();
        let name = match constraint.name {
            Some(name) => name,
            None => self.unused_row_name(row),
        };
        if self.row_names.contains(&name) {
            return Err(ModelError::DuplicateConstraint(name));
        }
        if !constraint.rhs.is_finite() {
            return Err(ModelError::InvalidCoefficient {
                context: format!("right-hand side of {name}"),
                value: constraint.rhs,
            });
        }
        let terms = self.resolve(&constraint.expr, &name)?;

        self.row_names.insert(name.clone());
        self.rows.push(PendingRow {
            name,
            terms,
            op: constraint.op,
            rhs: constraint.rhs,
        });
        Ok(row)
    }

    /// `c{row}`, suffixed until it differs from every name taken so far
    fn unused_row_name(&self, row: usize) -> String {
        let base = format!("c{row}");
        let mut name = base.clone();
        let mut suffix = 1;
        while self.row_names.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        name
    }

    /// Finish assembly and hand out the immutable model
    pub fn build(self) -> Model {
        let n = self.variables.len();

        let mut objective = vec![0.0; n];
        for (j, coef) in self.objective {
            objective[j] += coef;
        }

        let rows = self
            .rows
            .into_iter()
            .map(|pending| {
                let mut coefficients = vec![0.0; n];
                for (j, coef) in pending.terms {
                    coefficients[j] += coef;
                }
                Row {
                    name: pending.name,
                    coefficients,
                    op: pending.op,
                    rhs: pending.rhs,
                }
            })
            .collect();

        tracing::debug!(
            component = "model",
            operation = "build",
            variables = n,
            constraints = self.row_names.len(),
            "Built model {}",
            self.name
        );

        Model {
            name: self.name,
            variables: self.variables,
            sense: self.sense,
            objective,
            rows,
        }
    }

    fn resolve(&self, expr: &LinearExpr, context: &str) -> Result<Vec<(usize, f64)>, ModelError> {
        expr.terms()
            .iter()
            .map(|(name, coef)| {
                let j = *self
                    .index
                    .get(name)
                    .ok_or_else(|| ModelError::UnknownVariable(name.clone()))?;
                if !coef.is_finite() {
                    return Err(ModelError::InvalidCoefficient {
                        context: format!("{context} ({name})"),
                        value: *coef,
                    });
                }
                Ok((j, *coef))
            })
            .collect()
    }
}
