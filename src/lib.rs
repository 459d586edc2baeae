//! vislink - query compilation and linked layout for model visualizations
//!
//! A declarative visual query is expanded by table algebra into a grid of
//! atomic queries. Every cell is compiled into backend queries for each
//! facet (aggregations, samples, marginal and joint densities), all facets
//! are fetched concurrently, and the observed value ranges are linked
//! across the whole grid by yield.

pub mod algebra;
pub mod cli;
pub mod compiler;
pub mod context;
pub mod executor;
pub mod facets;
pub mod observability;
pub mod pql;
pub mod schema;
pub mod vismel;
