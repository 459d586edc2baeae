//! Facet derivation errors

use thiserror::Error;

use crate::pql::EntityError;
use crate::vismel::QueryError;

pub type DeriveResult<T> = Result<T, DeriveError>;

#[derive(Debug, Clone, Error)]
pub enum DeriveError {
    /// The facet has nothing to show. Callers skip it.
    #[error("Nothing to do: {0}")]
    NothingToDo(String),

    /// The derivation was called with a query it does not accept
    #[error("Query must be atomic: {0}")]
    NotAtomic(String),

    #[error("{0}")]
    Specification(#[from] QueryError),
}

impl From<EntityError> for DeriveError {
    fn from(e: EntityError) -> Self {
        DeriveError::Specification(QueryError::Entity(e))
    }
}

impl DeriveError {
    /// True for the recoverable "nothing to do" condition
    pub fn is_skip(&self) -> bool {
        matches!(self, DeriveError::NothingToDo(_))
    }

    pub fn code(&self) -> &'static str {
        match self {
            DeriveError::NothingToDo(_) => "VIS_DERIVE_NOTHING_TO_DO",
            DeriveError::NotAtomic(_) => "VIS_DERIVE_NOT_ATOMIC",
            DeriveError::Specification(e) => e.code(),
        }
    }
}
