//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::context::ContextError;
use crate::schema::SchemaError;
use crate::vismel::QueryError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Bad command line value
    InvalidArgument,
    /// I/O error (files, stdout)
    IoError,
    /// Header, query or configuration rejected
    InputRejected,
    /// Pipeline failed
    EvaluationFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "VIS_CLI_INVALID_ARGUMENT",
            Self::IoError => "VIS_CLI_IO_ERROR",
            Self::InputRejected => "VIS_CLI_INPUT_REJECTED",
            Self::EvaluationFailed => "VIS_CLI_EVALUATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArgument, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn input_rejected(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputRejected, msg)
    }

    pub fn evaluation_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::EvaluationFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::input_rejected(e.to_string())
    }
}

impl From<QueryError> for CliError {
    fn from(e: QueryError) -> Self {
        Self::input_rejected(format!("{}: {}", e.code(), e))
    }
}

impl From<ContextError> for CliError {
    fn from(e: ContextError) -> Self {
        match e {
            ContextError::Config(_) | ContextError::Schema(_) | ContextError::Query(_) => {
                Self::input_rejected(format!("{}: {}", e.code(), e))
            }
            other => Self::evaluation_failed(format!("{}: {}", other.code(), other)),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let e = CliError::invalid_argument("unknown facet 'x'");
        assert_eq!(e.to_string(), "VIS_CLI_INVALID_ARGUMENT: unknown facet 'x'");
    }

    #[test]
    fn test_context_error_mapping() {
        let e: CliError = ContextError::Config("bad".into()).into();
        assert_eq!(e.code_str(), "VIS_CLI_INPUT_REJECTED");
        let e: CliError = ContextError::Closed.into();
        assert_eq!(e.code_str(), "VIS_CLI_EVALUATION_FAILED");
    }
}
