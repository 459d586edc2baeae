//! Model schema subsystem
//!
//! Fields are the named dimensions of a model. They are read from the
//! backend's model header once per editing context and are immutable
//! afterwards.

mod errors;
mod loader;
mod types;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{parse_domain, ModelHeader};
pub use types::{DataType, Domain, Field, FieldRef};
