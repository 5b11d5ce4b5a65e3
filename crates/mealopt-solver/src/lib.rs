mod branch;
mod builder;
mod config;
mod error;
mod linalg;
mod lp_format;
mod problem;
mod simplex;
mod solution;
mod solver;

pub use builder::ModelBuilder;
pub use config::{PivotRule, SolverConfig};
pub use error::{ModelError, PivotError};
pub use linalg::{EPSILON, Matrix};
pub use problem::{
    Constraint, ConstraintOp, LinearExpr, Model, Objective, Row, Sense, VarId, VarKind, Variable,
};
pub use solution::{Assignment, Solution, SolutionStatus, SolveStats};
pub use solver::Solver;
