//! Table algebra errors

use thiserror::Error;

pub type AlgebraResult<T> = Result<T, AlgebraError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    /// `*` with an operand that has no rows
    #[error("Degenerate algebra: cannot cross with empty operand '{0}'")]
    DegenerateOperand(String),

    /// A cell may place at most one continuous entity on an axis
    #[error("Cell uses {count} continuous entities [{names}], at most one is allowed")]
    TooManyContinuous { count: usize, names: String },

    #[error("Expression expands to {cells} cells, limit is {limit}")]
    CellCapExceeded { cells: usize, limit: usize },

    #[error("Filters cannot be placed on an axis: '{0}'")]
    FilterOnAxis(String),
}

impl AlgebraError {
    pub fn code(&self) -> &'static str {
        match self {
            AlgebraError::DegenerateOperand(_) => "VIS_ALGEBRA_DEGENERATE",
            AlgebraError::TooManyContinuous { .. } => "VIS_ALGEBRA_CONTINUOUS",
            AlgebraError::CellCapExceeded { .. } => "VIS_ALGEBRA_CELL_CAP",
            AlgebraError::FilterOnAxis(_) => "VIS_ALGEBRA_FILTER_ON_AXIS",
        }
    }
}
