//! Backend and editing context errors

use thiserror::Error;

use crate::compiler::CompileError;
use crate::executor::ExtentError;
use crate::facets::DeriveError;
use crate::schema::SchemaError;
use crate::vismel::QueryError;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failures reported by a model backend
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Transport(String),

    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Header of '{model}' is invalid: {reason}")]
    Header { model: String, reason: String },
}

impl BackendError {
    pub fn code(&self) -> &'static str {
        match self {
            BackendError::Transport(_) => "VIS_BACKEND_TRANSPORT",
            BackendError::UnknownModel(_) => "VIS_BACKEND_UNKNOWN_MODEL",
            BackendError::Malformed(_) => "VIS_BACKEND_MALFORMED",
            BackendError::Header { .. } => "VIS_BACKEND_HEADER",
        }
    }
}

pub type ContextResult<T> = Result<T, ContextError>;

/// Any failure of one evaluation cycle
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("{0}")]
    Derive(#[from] DeriveError),

    #[error("{0}")]
    Extent(#[from] ExtentError),

    #[error("{0}")]
    Backend(#[from] BackendError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The context was shut down while an evaluation was pending
    #[error("Editing context closed")]
    Closed,
}

impl ContextError {
    /// True for conditions the caller treats as "nothing to show"
    pub fn is_skip(&self) -> bool {
        matches!(self, ContextError::Derive(e) if e.is_skip())
    }

    /// Stable code for user-visible messages
    pub fn code(&self) -> &'static str {
        match self {
            ContextError::Schema(e) => e.code().code(),
            ContextError::Query(e) => e.code(),
            ContextError::Compile(e) => e.code().code(),
            ContextError::Derive(e) => e.code(),
            ContextError::Extent(e) => e.code(),
            ContextError::Backend(e) => e.code(),
            ContextError::Config(_) => "VIS_CONFIG_INVALID",
            ContextError::Closed => "VIS_CONTEXT_CLOSED",
        }
    }
}
