//! Query entity model
//!
//! Splits, aggregations, densities and filters over model fields, the
//! per-evaluation identity registry that keeps derived entities shared, and
//! the JSON forms sent to the model backend.

mod entity;
mod errors;
mod extent;
mod session;
mod wire;

pub use entity::{
    Aggregation, AggregationMethod, Density, DensityMethod, Entity, EntityId, EntityKind,
    EntityRef, Filter, FilterMethod, Split, SplitMethod, DEFAULT_SPLIT_BUCKETS, MODEL_VS_DATA,
};
pub use errors::{EntityError, EntityResult};
pub use extent::{Extent, DEFAULT_PADDING};
pub use session::Session;
pub use wire::{
    BackendQuery, DataCategory, HeaderQuery, PredictQuery, ResponseTable, SelectOptions,
    SelectQuery, SelectTag,
};
