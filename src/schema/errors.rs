//! Schema error types
//!
//! Error codes:
//! - VIS_HEADER_MALFORMED (REJECT)
//! - VIS_FIELD_INVALID (REJECT)
//! - VIS_FIELD_UNKNOWN (REJECT)
//! - VIS_DOMAIN_MISMATCH (REJECT)
//! - VIS_EXTENT_UNBOUNDED (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending input is rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Model header is not valid JSON or misses required keys
    VisHeaderMalformed,
    /// Field definition is inconsistent (dtype vs domain)
    VisFieldInvalid,
    /// Field name is not part of the model header
    VisFieldUnknown,
    /// Domain operation across discrete and numeric domains
    VisDomainMismatch,
    /// A field extent must always be bounded
    VisExtentUnbounded,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::VisHeaderMalformed => "VIS_HEADER_MALFORMED",
            SchemaErrorCode::VisFieldInvalid => "VIS_FIELD_INVALID",
            SchemaErrorCode::VisFieldUnknown => "VIS_FIELD_UNKNOWN",
            SchemaErrorCode::VisDomainMismatch => "VIS_DOMAIN_MISMATCH",
            SchemaErrorCode::VisExtentUnbounded => "VIS_EXTENT_UNBOUNDED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error with context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    field: Option<String>,
}

impl SchemaError {
    /// Create a malformed header error
    pub fn malformed_header(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::VisHeaderMalformed,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::VisFieldInvalid,
            message: format!("Field '{}': {}", f, reason.into()),
            field: Some(f),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::VisFieldUnknown,
            message: format!("Field '{}' is not part of the model", f),
            field: Some(f),
        }
    }

    /// Create a domain mismatch error
    pub fn domain_mismatch(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::VisDomainMismatch,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an unbounded extent error
    pub fn unbounded_extent(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: SchemaErrorCode::VisExtentUnbounded,
            message: format!("Extent of field '{}' may not be unbounded", f),
            field: Some(f),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
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

impl fmt::Display for SchemaError {
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

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
