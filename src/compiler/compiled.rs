//! Compiled query and its column maps

use std::collections::HashMap;

use crate::pql::{BackendQuery, Entity, EntityId, EntityRef};

/// A backend query plus the mapping between query entities and result
/// columns.
///
/// Several entities may map to one column (e.g. two instances of the same
/// split). Every column maps back to exactly one entity, the first one that
/// claimed it.
#[derive(Debug, Clone)]
pub struct Compiled {
    query: BackendQuery,
    fu2idx: HashMap<EntityId, usize>,
    idx2fu: Vec<EntityRef>,
}

impl Compiled {
    pub(crate) fn new(
        query: BackendQuery,
        fu2idx: HashMap<EntityId, usize>,
        idx2fu: Vec<EntityRef>,
    ) -> Self {
        Self {
            query,
            fu2idx,
            idx2fu,
        }
    }

    pub fn query(&self) -> &BackendQuery {
        &self.query
    }

    /// Same column layout, run against another model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            query: self.query.clone().with_model(model),
            fu2idx: self.fu2idx.clone(),
            idx2fu: self.idx2fu.clone(),
        }
    }

    /// Column holding the values of `entity`
    pub fn column_of(&self, entity: &Entity) -> Option<usize> {
        self.fu2idx.get(&entity.id()).copied()
    }

    /// Entity that owns column `idx`
    pub fn entity_at(&self, idx: usize) -> Option<&EntityRef> {
        self.idx2fu.get(idx)
    }

    /// Owning entity per column
    pub fn columns(&self) -> &[EntityRef] {
        &self.idx2fu
    }

    pub fn column_count(&self) -> usize {
        self.idx2fu.len()
    }

    pub fn fu2idx(&self) -> &HashMap<EntityId, usize> {
        &self.fu2idx
    }
}
