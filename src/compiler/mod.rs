//! Query compiler
//!
//! Compiles atomic declarative queries into backend queries and records
//! which entity is represented by which result column.
//!
//! Entities are collected from the whole query and deduplicated by
//! identity. Splits of one field share a column only if they use the same
//! method; otherwise compilation fails.

mod compiled;
mod errors;
mod predict;
mod sample;

pub use compiled::Compiled;
pub use errors::{CompileError, CompileErrorCode, CompileResult, Severity};
pub use predict::compile_predict;
pub use sample::compile_sample;
