//! Declarative visualization queries
//!
//! A query binds model entities to the layout axes and to visual channels.
//! Templated queries expand into a grid of atomic queries, one per plot
//! cell.

mod errors;
mod query;
mod spec;
mod template;

pub use errors::{QueryError, QueryResult};
pub use query::{Axis, ChannelMap, ColorEncoding, ColorMap, Layer, Layout, Query, ScaleFamily};
pub use spec::{ColorSpec, EntitySpec, QuerySpec};
pub use template::{expand, QueryGrid};
