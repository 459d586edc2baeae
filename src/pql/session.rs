//! Evaluation session and entity identity registry
//!
//! A [`Session`] lives for exactly one evaluation of a top-level query. All
//! entities created while compiling the query grid and deriving its facets
//! are interned here, so that two derivations asking for "the same" entity
//! receive the same instance and therefore share one extent.
//!
//! A failed evaluation drops its session. Nothing is ever merged back into
//! an earlier session.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entity::{Entity, EntityKind, EntityRef};

/// Identity registry for one evaluation
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    registry: HashMap<String, EntityRef>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            registry: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Registers an existing entity. If an entity with the same canonical
    /// identity is already known, that one is returned instead.
    pub fn intern(&mut self, entity: EntityRef) -> EntityRef {
        self.registry
            .entry(entity.identity_key())
            .or_insert(entity)
            .clone()
    }

    /// Returns the live entity for `kind`, creating it on first request
    pub fn intern_kind(&mut self, kind: impl Into<EntityKind>) -> EntityRef {
        let kind = kind.into();
        self.registry
            .entry(kind.identity_key())
            .or_insert_with(|| Entity::new(kind))
            .clone()
    }

    /// Looks up the entity for `kind` without registering anything
    pub fn lookup(&self, kind: &EntityKind) -> Option<&EntityRef> {
        self.registry.get(&kind.identity_key())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// All interned entities, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = &EntityRef> {
        self.registry.values()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::entity::Split;
    use crate::schema::Field;
    use std::sync::Arc;

    #[test]
    fn test_intern_kind_returns_same_instance() {
        let age = Field::numerical("age", 0.0, 1.0, "m").unwrap();
        let mut session = Session::new();

        let a = session.intern_kind(Split::default_for(&age));
        let b = session.intern_kind(Split::default_for(&age));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(session.len(), 1);

        let c = session.intern_kind(Split::for_density(&age, 50).unwrap());
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_intern_prefers_registered_entity() {
        let sex = Field::categorical("sex", ["F", "M"], "m").unwrap();
        let mut session = Session::new();

        let first = Entity::new(Split::default_for(&sex));
        let second = Entity::new(Split::default_for(&sex));
        let kept = session.intern(first.clone());
        let again = session.intern(second);
        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&again, &first));
    }

    #[test]
    fn test_sessions_are_independent() {
        let sex = Field::categorical("sex", ["F", "M"], "m").unwrap();
        let mut one = Session::new();
        let mut two = Session::new();
        let a = one.intern_kind(Split::default_for(&sex));
        let b = two.intern_kind(Split::default_for(&sex));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_ne!(one.id(), two.id());
        assert!(two.lookup(a.kind()).is_some());
    }
}
