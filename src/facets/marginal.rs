//! Marginal density facet
//!
//! Derives from an atomic query the query for the 1-D density along one
//! axis. The derived query:
//! - places a high resolution split of the axis field on that axis,
//! - places a density over the axis field and all kept splits on the other axis,
//! - turns a measure on color into a split of its field,
//! - moves shape and size into the details as splits,
//! - keeps the filters, by reference.
//!
//! Only splits over discrete fields other than the axis field are kept.
//! Anything else would put a second split of a different method on a
//! field, or split the density by a continuous field.
//!
//! All new entities are interned in the session, so deriving the same
//! marginal twice yields the same entities.

use std::sync::Arc;

use super::errors::{DeriveError, DeriveResult};
use crate::pql::{Density, EntityRef, Session, Split};
use crate::schema::FieldRef;
use crate::vismel::{Axis, ColorMap, Layer, Layout, Query};

/// Derives the marginal density query for `axis`.
///
/// Fails with [`DeriveError::NothingToDo`] if the axis is empty, before
/// touching the session.
pub fn derive_marginal(
    query: &Query,
    axis: Axis,
    session: &mut Session,
    resolution: u32,
) -> DeriveResult<Query> {
    if !query.has_flat_layout() {
        return Err(DeriveError::NotAtomic(format!(
            "marginal of {} needs at most one entity per axis",
            axis.as_str()
        )));
    }
    let axis_entity = query
        .axis_entity(axis)
        .ok_or_else(|| DeriveError::NothingToDo(format!("empty {}", axis.as_str())))?;
    let axis_field = axis_entity.kind().primary_field();

    let mut layers = Vec::with_capacity(query.layers.len());
    for layer in &query.layers {
        layers.push(marginal_layer(layer, axis_field, session));
    }

    let density_split = session.intern_kind(Split::for_density(axis_field, resolution)?);

    let mut fields = vec![Arc::clone(axis_field)];
    for layer in &layers {
        for split in layer.channel_entities() {
            fields.extend(split.fields().into_iter().cloned());
        }
    }
    let density = session.intern_kind(Density::new(fields)?);

    let layout = match axis {
        Axis::Rows => Layout::new(vec![density_split], vec![density]),
        Axis::Cols => Layout::new(vec![density], vec![density_split]),
    };
    Ok(Query::new(query.source.clone(), layout, layers)?)
}

fn marginal_layer(layer: &Layer, axis_field: &FieldRef, session: &mut Session) -> Layer {
    let color = layer.color.as_ref().and_then(|c| {
        kept_split(&c.entity, axis_field, session).map(|entity| ColorMap {
            entity,
            encoding: c.encoding,
        })
    });

    let channels = layer.shape.iter().chain(layer.size.iter()).map(|c| &c.entity);
    let mut details: Vec<EntityRef> = Vec::new();
    for entity in layer.details.iter().chain(channels) {
        let Some(split) = kept_split(entity, axis_field, session) else {
            continue;
        };
        if !details.iter().any(|d| Arc::ptr_eq(d, &split)) {
            details.push(split);
        }
    }

    Layer {
        filters: layer.filters.clone(),
        color,
        shape: None,
        size: None,
        details,
    }
}

/// The split an entity contributes to the marginal, if any.
///
/// Splits stay as they are, anything else becomes the default split of its
/// primary field. Splits of continuous fields and of the axis field are
/// dropped.
fn kept_split(entity: &EntityRef, axis_field: &FieldRef, session: &mut Session) -> Option<EntityRef> {
    let field = entity.kind().primary_field();
    if !field.is_discrete() || field.name == axis_field.name {
        return None;
    }
    if entity.is_split() {
        return Some(entity.clone());
    }
    Some(session.intern_kind(Split::from_kind(entity.kind())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::{Aggregation, AggregationMethod, Entity, SplitMethod};
    use crate::schema::{Field, FieldRef};
    use crate::vismel::{ChannelMap, ColorEncoding};

    fn fields() -> (FieldRef, FieldRef, FieldRef) {
        (
            Field::categorical("sex", ["F", "M"], "m").unwrap(),
            Field::numerical("age", 18.0, 90.0, "m").unwrap(),
            Field::numerical("income", 0.0, 100.0, "m").unwrap(),
        )
    }

    fn base(sex: &FieldRef, age: &FieldRef, income: &FieldRef) -> Query {
        let avg = Entity::new(Aggregation::new(vec![age.clone()], AggregationMethod::Average, "age").unwrap());
        let avg_income =
            Entity::new(Aggregation::new(vec![income.clone()], AggregationMethod::Maximum, "income").unwrap());
        let layer = Layer {
            color: Some(ColorMap::new(avg_income, ColorEncoding::Hue)),
            shape: Some(ChannelMap::new(Entity::new(Split::default_for(sex)))),
            ..Layer::default()
        };
        Query::new("m", Layout::new(vec![avg], vec![]), vec![layer]).unwrap()
    }

    #[test]
    fn test_marginal_structure() {
        let (sex, age, income) = fields();
        let q = base(&sex, &age, &income);
        let mut session = Session::new();

        let m = derive_marginal(&q, Axis::Rows, &mut session, 50).unwrap();
        let split = m.layout.rows[0].as_split().unwrap();
        assert_eq!(split.method, SplitMethod::Density);
        assert_eq!(split.args, vec![50]);
        assert!(Arc::ptr_eq(&split.field, &age));

        // max(income) is continuous and dropped, the shape moves to details
        assert!(m.layer().color.is_none());
        assert!(m.layer().shape.is_none());
        assert_eq!(m.layer().details.len(), 1);
        assert_eq!(m.layer().details[0].yields(), "sex");
        assert_eq!(m.layout.cols[0].yields(), "density(age,sex)");
    }

    #[test]
    fn test_marginal_is_idempotent() {
        let (sex, age, income) = fields();
        let q = base(&sex, &age, &income);
        let mut session = Session::new();

        let a = derive_marginal(&q, Axis::Rows, &mut session, 50).unwrap();
        let b = derive_marginal(&q, Axis::Rows, &mut session, 50).unwrap();
        assert!(Arc::ptr_eq(&a.layout.rows[0], &b.layout.rows[0]));
        assert!(Arc::ptr_eq(&a.layout.cols[0], &b.layout.cols[0]));
        assert!(Arc::ptr_eq(&a.layer().details[0], &b.layer().details[0]));
    }

    #[test]
    fn test_measure_on_axis_field_is_dropped() {
        let (_, age, _) = fields();
        let avg = || Entity::new(Aggregation::new(vec![age.clone()], AggregationMethod::Average, "age").unwrap());
        let layer = Layer {
            color: Some(ColorMap::new(avg(), ColorEncoding::Hue)),
            details: vec![Entity::new(Split::default_for(&age))],
            ..Layer::default()
        };
        let q = Query::new("m", Layout::new(vec![avg()], vec![]), vec![layer]).unwrap();

        let m = derive_marginal(&q, Axis::Rows, &mut Session::new(), 50).unwrap();
        assert!(m.layer().color.is_none());
        assert!(m.layer().details.is_empty());
        assert_eq!(m.layout.cols[0].yields(), "density(age)");
        assert_eq!(crate::compiler::compile_predict(&m).unwrap().column_count(), 2);
    }

    #[test]
    fn test_empty_axis_is_skipped_without_interning() {
        let (sex, age, income) = fields();
        let q = base(&sex, &age, &income);
        let mut session = Session::new();

        let err = derive_marginal(&q, Axis::Cols, &mut session, 50).unwrap_err();
        assert!(err.is_skip());
        assert!(session.is_empty());
    }

    #[test]
    fn test_filters_shared() {
        let (sex, age, income) = fields();
        let mut q = base(&sex, &age, &income);
        let filter = Entity::new(crate::pql::Filter::default_for(&income));
        q.layers[0].filters.push(filter.clone());

        let m = derive_marginal(&q, Axis::Rows, &mut Session::new(), 50).unwrap();
        assert!(Arc::ptr_eq(&m.layer().filters[0], &filter));
    }
}
