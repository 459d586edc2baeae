//! Sample compiler
//!
//! Derives a row-level select query from an atomic declarative query:
//! - filters stay filters, except the model-vs-data sentinel
//! - splits select their field
//! - aggregations select the field they yield
//! - densities are dropped
//!
//! Entities selecting the same name share one column.

use std::collections::HashMap;

use super::compiled::Compiled;
use super::errors::{CompileError, CompileResult};
use crate::pql::{
    BackendQuery, EntityKind, EntityRef, SelectOptions, SelectQuery, SelectTag, MODEL_VS_DATA,
};
use crate::vismel::Query;

/// Compiles an atomic query into a select query
pub fn compile_sample(query: &Query, opts: SelectOptions) -> CompileResult<Compiled> {
    if !query.has_flat_layout() {
        return Err(CompileError::not_atomic(
            "select queries need at most one entity per axis",
        ));
    }
    let entities = query.entities();
    check_splits(&entities)?;

    let mut fu2idx = HashMap::new();
    let mut idx2fu: Vec<EntityRef> = Vec::new();
    let mut select: Vec<String> = Vec::new();
    let mut where_ = Vec::new();

    for entity in &entities {
        let name = match entity.kind() {
            EntityKind::Filter(f) => {
                if f.field.name != MODEL_VS_DATA {
                    where_.push(f.to_json());
                }
                continue;
            }
            EntityKind::Density(_) => continue,
            EntityKind::Split(s) => s.field.name.clone(),
            EntityKind::Aggregation(a) => a.yields.clone(),
        };
        match select.iter().position(|s| *s == name) {
            Some(idx) => {
                fu2idx.insert(entity.id(), idx);
            }
            None => {
                fu2idx.insert(entity.id(), select.len());
                select.push(name);
                idx2fu.push(entity.clone());
            }
        }
    }

    let backend = BackendQuery::Select(SelectQuery {
        tag: SelectTag::Select,
        from: query.source.clone(),
        select,
        where_,
        opts,
    });
    Ok(Compiled::new(backend, fu2idx, idx2fu))
}

/// Rejects splits of one field with different methods
fn check_splits(entities: &[EntityRef]) -> CompileResult<()> {
    let mut seen = HashMap::new();
    for split in entities.iter().filter_map(|e| e.as_split()) {
        if let Some(method) = seen.insert(split.field.name.as_str(), split.method) {
            if method != split.method {
                return Err(CompileError::ambiguous_split(
                    split.field.name.clone(),
                    method.as_str(),
                    split.method.as_str(),
                ));
            }
        }
    }
    Ok(())
}
