//! Editing contexts and the evaluation pipeline
//!
//! # Flow (strict order per evaluation)
//!
//! 1. Resolve the spec and expand the template
//! 2. Compile the cell queries and derive the facet queries
//! 3. Fetch every facet concurrently from the model backend
//! 4. Aggregate extents and publish them onto the entities
//!
//! Edits are debounced per context. Stale results are discarded, failures
//! leave the previous result in place.

mod backend;
mod config;
#[allow(clippy::module_inception)]
mod context;
mod dummy;
mod errors;
mod pipeline;

pub use backend::{BackendFuture, ModelBackend};
pub use config::{ContextConfig, FacetToggles, VariantConfig};
pub use context::{ContextState, EditingContext, Failure};
pub use dummy::DummyBackend;
pub use errors::{BackendError, BackendResult, ContextError, ContextResult};
pub use pipeline::{evaluate, facet_queries, Evaluation};
