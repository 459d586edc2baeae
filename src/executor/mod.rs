//! Result assembly for the query grid
//!
//! Backend responses become typed [`ResultTable`]s carrying the entity to
//! column maps of their compiled query. Tables are grouped into one
//! [`FacetCollection`] per facet, and the extents observed across all
//! collections are linked by yield and published onto the entities.
//!
//! # Invariants
//!
//! - Column types come from the owning entity, not from the payload
//! - Extents are published once per evaluation, after all fetches settled

mod collection;
mod errors;
mod linker;
mod result;

pub use collection::{FacetCollection, FacetTables};
pub use errors::{ExtentError, ExtentResult};
pub use linker::{aggregate, ExtentAggregator, LinkedExtents};
pub use result::{Datum, ResultTable};
