//! Result assembly and extent linking errors

use thiserror::Error;

pub type ExtentResult<T> = Result<T, ExtentError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtentError {
    /// The response does not have one column per compiled column
    #[error("Column mismatch: expected {expected} columns, backend sent {found}")]
    ColumnMismatch { expected: usize, found: usize },

    /// A row of the response has the wrong width
    #[error("Row {row} has {found} values, expected {expected}")]
    RowMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A value does not fit the data type of its column
    #[error("Column '{column}' expects {expected} values, got {value}")]
    BadValue {
        column: String,
        expected: &'static str,
        value: String,
    },

    /// Two extents with the same yield have different data types
    #[error("Extents of '{0}' mix discrete and continuous values")]
    KindMismatch(String),

    /// An entity already carries a published extent
    #[error("Extent of '{0}' was already published")]
    AlreadyPublished(String),
}

impl ExtentError {
    pub fn code(&self) -> &'static str {
        match self {
            ExtentError::ColumnMismatch { .. } | ExtentError::RowMismatch { .. } => {
                "VIS_RESULT_SHAPE"
            }
            ExtentError::BadValue { .. } => "VIS_RESULT_BAD_VALUE",
            ExtentError::KindMismatch(_) => "VIS_EXTENT_KIND_MISMATCH",
            ExtentError::AlreadyPublished(_) => "VIS_EXTENT_ALREADY_PUBLISHED",
        }
    }
}
