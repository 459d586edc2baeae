//! # Query entity errors

use thiserror::Error;

/// Result type for entity construction
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors raised while constructing query entities
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    #[error("Unknown {kind} method: '{method}'")]
    UnknownMethod { kind: &'static str, method: String },

    #[error("Invalid method for {kind} on field '{field}': {reason}")]
    InvalidMethod {
        kind: &'static str,
        field: String,
        reason: String,
    },

    #[error("Invalid arguments for {kind} on field '{field}': {reason}")]
    InvalidArgs {
        kind: &'static str,
        field: String,
        reason: String,
    },

    #[error("Aggregation yields '{yields}' which is not one of its fields [{fields}]")]
    YieldNotInFields { yields: String, fields: String },

    #[error("{0} requires at least one field")]
    NoFields(&'static str),
}

impl EntityError {
    /// Stable code for user-visible messages
    pub fn code(&self) -> &'static str {
        match self {
            EntityError::UnknownMethod { .. } => "VIS_ENTITY_UNKNOWN_METHOD",
            EntityError::InvalidMethod { .. } => "VIS_ENTITY_INVALID_METHOD",
            EntityError::InvalidArgs { .. } => "VIS_ENTITY_INVALID_ARGS",
            EntityError::YieldNotInFields { .. } => "VIS_ENTITY_INVALID_YIELD",
            EntityError::NoFields(_) => "VIS_ENTITY_NO_FIELDS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            EntityError::NoFields("Density").code(),
            "VIS_ENTITY_NO_FIELDS"
        );
        let err = EntityError::YieldNotInFields {
            yields: "income".into(),
            fields: "age".into(),
        };
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_YIELD");
        assert!(err.to_string().contains("income"));
    }
}
