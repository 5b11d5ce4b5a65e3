use thiserror::Error;

/// Errors raised while assembling a [`Model`](crate::Model)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Duplicate constraint: {0}")]
    DuplicateConstraint(String),
    #[error("Invalid bounds for variable {name}: [{lower}, {upper}]")]
    InvalidBounds { name: String, lower: f64, upper: f64 },
    #[error("Invalid coefficient {value} in {context}")]
    InvalidCoefficient { context: String, value: f64 },
}

/// Errors raised by the dense linear algebra routines
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PivotError {
    #[error("Pivot element {value:e} at ({row}, {col}) is numerically zero")]
    NumericDegeneracy { row: usize, col: usize, value: f64 },
    #[error("Pivot position ({row}, {col}) is outside the matrix")]
    OutOfBounds { row: usize, col: usize },
}
