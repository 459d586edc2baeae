//! Declarative query errors

use thiserror::Error;

use crate::algebra::AlgebraError;
use crate::pql::EntityError;
use crate::schema::SchemaError;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Entity(#[from] EntityError),

    #[error("{0}")]
    Algebra(#[from] AlgebraError),

    #[error("Malformed query specification: {0}")]
    Malformed(String),

    #[error("Query has no layer")]
    NoLayer,

    #[error("Query is from '{found}' but the header describes '{expected}'")]
    SourceMismatch { expected: String, found: String },
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Schema(e) => e.code().code(),
            QueryError::Entity(e) => e.code(),
            QueryError::Algebra(e) => e.code(),
            QueryError::Malformed(_) => "VIS_QUERY_MALFORMED",
            QueryError::NoLayer => "VIS_QUERY_NO_LAYER",
            QueryError::SourceMismatch { .. } => "VIS_QUERY_SOURCE_MISMATCH",
        }
    }

    /// True if template expansion hit the grid size cap
    pub fn is_cell_cap(&self) -> bool {
        matches!(
            self,
            QueryError::Algebra(AlgebraError::CellCapExceeded { .. })
        )
    }
}
