//! Extent aggregation and linking
//!
//! After all facet collections of a grid have been fetched, the observed
//! value ranges are unioned per entity, re-keyed by yield and normalized for
//! display. Publishing writes the final extent onto every entity sharing a
//! yield, exactly once per evaluation.
//!
//! # Flow (strict order)
//!
//! 1. `observe` every result table (any order, any grouping)
//! 2. `merge` partial aggregators if the tables were split up
//! 3. `finish` to re-key by yield and pad continuous extents
//! 4. `publish` onto the entities

use std::collections::{BTreeMap, HashMap};

use super::collection::FacetCollection;
use super::errors::{ExtentError, ExtentResult};
use super::result::ResultTable;
use crate::pql::{EntityId, EntityRef, Extent};

/// Running union of observed extents, keyed by entity identity
#[derive(Debug, Clone, Default)]
pub struct ExtentAggregator {
    entities: BTreeMap<EntityId, EntityRef>,
    extents: HashMap<EntityId, Extent>,
}

impl ExtentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `entity` a publishing target without observing values.
    /// Filters carry no extent and are ignored.
    pub fn register(&mut self, entity: &EntityRef) {
        if !entity.is_filter() {
            self.entities.entry(entity.id()).or_insert_with(|| entity.clone());
        }
    }

    /// Unions the observed extent of every column into its owning entity
    pub fn observe(&mut self, table: &ResultTable) -> ExtentResult<()> {
        for (idx, entity) in table.idx2fu().iter().enumerate() {
            self.register(entity);
            if let Some(extent) = table.observed_extent(idx) {
                self.absorb(entity.id(), &entity.yields(), extent)?;
            }
        }
        Ok(())
    }

    /// Observes every table of a collection
    pub fn observe_collection(&mut self, collection: &FacetCollection) -> ExtentResult<()> {
        for table in collection.tables() {
            self.observe(table)?;
        }
        Ok(())
    }

    /// Union of two partial aggregations
    pub fn merge(mut self, other: ExtentAggregator) -> ExtentResult<Self> {
        for (id, entity) in other.entities {
            let yields = entity.yields();
            self.entities.entry(id).or_insert(entity);
            if let Some(extent) = other.extents.get(&id) {
                self.absorb(id, &yields, extent.clone())?;
            }
        }
        Ok(self)
    }

    /// Observed extent of one entity, before re-keying
    pub fn entity_extent(&self, id: EntityId) -> Option<&Extent> {
        self.extents.get(&id)
    }

    /// Re-keys by yield and normalizes continuous extents by `padding`
    pub fn finish(self, padding: f64) -> ExtentResult<LinkedExtents> {
        let mut by_yield: BTreeMap<String, Extent> = BTreeMap::new();
        for (id, extent) in &self.extents {
            let Some(entity) = self.entities.get(id) else {
                continue;
            };
            let yields = entity.yields();
            let merged = match by_yield.get(&yields) {
                Some(prev) => prev
                    .union(extent)
                    .ok_or_else(|| ExtentError::KindMismatch(yields.clone()))?,
                None => extent.clone(),
            };
            by_yield.insert(yields, merged);
        }
        let extents = by_yield
            .into_iter()
            .map(|(y, e)| (y, e.normalized(padding)))
            .collect();
        Ok(LinkedExtents {
            extents,
            entities: self.entities.into_values().collect(),
        })
    }

    fn absorb(&mut self, id: EntityId, yields: &str, extent: Extent) -> ExtentResult<()> {
        let merged = match self.extents.get(&id) {
            Some(prev) => prev
                .union(&extent)
                .ok_or_else(|| ExtentError::KindMismatch(yields.to_string()))?,
            None => extent,
        };
        self.extents.insert(id, merged);
        Ok(())
    }
}

/// Aggregates all tables of all collections
pub fn aggregate(collections: &[FacetCollection]) -> ExtentResult<ExtentAggregator> {
    let mut agg = ExtentAggregator::new();
    for c in collections {
        agg.observe_collection(c)?;
    }
    Ok(agg)
}

/// Final display extents, keyed by yield
#[derive(Debug, Clone)]
pub struct LinkedExtents {
    extents: BTreeMap<String, Extent>,
    entities: Vec<EntityRef>,
}

impl LinkedExtents {
    pub fn get(&self, yields: &str) -> Option<&Extent> {
        self.extents.get(yields)
    }

    pub fn extents(&self) -> &BTreeMap<String, Extent> {
        &self.extents
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }

    /// Writes the extent of its yield onto every entity. Entities whose yield
    /// was never observed stay unset. Returns the number of entities written.
    pub fn publish(&self) -> ExtentResult<usize> {
        let mut written = 0;
        for entity in &self.entities {
            let yields = entity.yields();
            let Some(extent) = self.extents.get(&yields) else {
                continue;
            };
            entity
                .set_extent(extent.clone())
                .map_err(|_| ExtentError::AlreadyPublished(yields))?;
            written += 1;
        }
        Ok(written)
    }
}
