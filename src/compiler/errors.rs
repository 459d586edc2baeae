//! Compiler error types
//!
//! Error codes:
//! - VIS_COMPILE_AMBIGUOUS_SPLIT (REJECT)
//! - VIS_COMPILE_NOT_ATOMIC (REJECT)
//! - VIS_COMPILE_INVALID (REJECT)

use std::fmt;

/// Severity levels for compiler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The query is rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Compiler-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Two splits of one field use different methods
    VisCompileAmbiguousSplit,
    /// An atomic query was required
    VisCompileNotAtomic,
    /// Any other malformed query
    VisCompileInvalid,
}

impl CompileErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::VisCompileAmbiguousSplit => "VIS_COMPILE_AMBIGUOUS_SPLIT",
            CompileErrorCode::VisCompileNotAtomic => "VIS_COMPILE_NOT_ATOMIC",
            CompileErrorCode::VisCompileInvalid => "VIS_COMPILE_INVALID",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compiler error with context
#[derive(Debug, Clone)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    field: Option<String>,
}

impl CompileError {
    /// Create an ambiguous split error
    pub fn ambiguous_split(field: impl Into<String>, first: &str, second: &str) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::VisCompileAmbiguousSplit,
            message: format!(
                "Field '{}' is split by both '{}' and '{}' in one atomic query",
                f, first, second
            ),
            field: Some(f),
        }
    }

    /// Create a not atomic error
    pub fn not_atomic(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::VisCompileNotAtomic,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an invalid query error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: CompileErrorCode::VisCompileInvalid,
            message: reason.into(),
            field: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the field name if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for CompileError {}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CompileErrorCode::VisCompileAmbiguousSplit.code(),
            "VIS_COMPILE_AMBIGUOUS_SPLIT"
        );
        assert_eq!(
            CompileErrorCode::VisCompileNotAtomic.code(),
            "VIS_COMPILE_NOT_ATOMIC"
        );
    }

    #[test]
    fn test_ambiguous_split_display() {
        let err = CompileError::ambiguous_split("age", "equiinterval", "identity");
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] VIS_COMPILE_AMBIGUOUS_SPLIT"));
        assert!(display.contains("equiinterval"));
        assert_eq!(err.field(), Some("age"));
    }
}
