/// Column index of a variable inside a [`Model`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VarKind {
    Continuous,
    Integer,
}

/// A decision variable with bounds and an integrality flag
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
    pub kind: VarKind,
}

impl Variable {
    /// Continuous variable in `[0, +inf)`
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: f64::INFINITY,
            kind: VarKind::Continuous,
        }
    }

    /// Integer variable in `[0, +inf)`
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            kind: VarKind::Integer,
            ..Self::continuous(name)
        }
    }

    /// Integer variable in `[0, 1]`
    pub fn binary(name: impl Into<String>) -> Self {
        Self::integer(name).with_bounds(0.0, 1.0)
    }

    pub fn with_lower(mut self, lower: f64) -> Self {
        self.lower = lower;
        self
    }

    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = upper;
        self
    }

    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Remove both bounds
    pub fn free(self) -> Self {
        self.with_bounds(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn is_integer(&self) -> bool {
        self.kind == VarKind::Integer
    }
}

/// Sum of `coefficient * variable` terms, keyed by variable name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(String, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term. Terms naming the same variable are summed.
    pub fn term(mut self, variable: impl Into<String>, coefficient: f64) -> Self {
        self.add_term(variable, coefficient);
        self
    }

    pub fn add_term(&mut self, variable: impl Into<String>, coefficient: f64) {
        let variable = variable.into();
        match self.terms.iter_mut().find(|(name, _)| *name == variable) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((variable, coefficient)),
        }
    }

    pub fn terms(&self) -> &[(String, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn le(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Le, rhs)
    }

    pub fn ge(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Ge, rhs)
    }

    pub fn equals(self, rhs: f64) -> Constraint {
        Constraint::new(self, ConstraintOp::Eq, rhs)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (name, coefficient) in iter {
            expr.add_term(name, coefficient);
        }
        expr
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }

    /// Whether `lhs op rhs` holds within `tolerance`
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ConstraintOp::Le => lhs <= rhs + tolerance,
            ConstraintOp::Ge => lhs >= rhs - tolerance,
            ConstraintOp::Eq => (lhs - rhs).abs() <= tolerance,
        }
    }
}

/// A linear constraint as supplied to the builder
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: Option<String>,
    pub expr: LinearExpr,
    pub op: ConstraintOp,
    pub rhs: f64,
}

impl Constraint {
    pub fn new(expr: LinearExpr, op: ConstraintOp, rhs: f64) -> Self {
        Self {
            name: None,
            expr,
            op,
            rhs,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Objective {
    pub sense: Sense,
    pub expr: LinearExpr,
}

impl Objective {
    pub fn minimize(expr: LinearExpr) -> Self {
        Self {
            sense: Sense::Minimize,
            expr,
        }
    }

    pub fn maximize(expr: LinearExpr) -> Self {
        Self {
            sense: Sense::Maximize,
            expr,
        }
    }
}

/// A constraint resolved against the model's columns
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable, in column order
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    pub rhs: f64,
}

impl Row {
    pub fn activity(&self, values: &[f64]) -> f64 {
        crate::linalg::dot(&self.coefficients, values)
    }
}

/// An immutable mixed-integer linear program.
///
/// Built with [`ModelBuilder`](crate::ModelBuilder); every name has been
/// resolved to a column index by the time a `Model` exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub(crate) name: String,
    pub(crate) variables: Vec<Variable>,
    pub(crate) sense: Sense,
    pub(crate) objective: Vec<f64>,
    pub(crate) rows: Vec<Row>,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn var_id(&self, name: &str) -> Option<VarId> {
        self.variables.iter().position(|v| v.name == name).map(VarId)
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Objective coefficients, in column order
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn has_integers(&self) -> bool {
        self.variables.iter().any(Variable::is_integer)
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        crate::linalg::dot(&self.objective, values)
    }

    /// Names of the rows and bounds violated by `values` beyond `tolerance`
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violated = Vec::new();
        for (var, &x) in self.variables.iter().zip(values) {
            if x < var.lower - tolerance || x > var.upper + tolerance {
                violated.push(var.name.clone());
            }
        }
        for row in &self.rows {
            if !row.op.holds(row.activity(values), row.rhs, tolerance) {
                violated.push(row.name.clone());
            }
        }
        violated
    }

    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len() && self.violations(values, tolerance).is_empty()
    }
}
