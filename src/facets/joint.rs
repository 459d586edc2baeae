//! Joint density facet
//!
//! The 2-D density of the fields on the two axes, drawn as a lightness
//! encoded heatmap behind the main marks. Only the fields on the axes
//! contribute; channels of the base query are dropped.

use super::errors::{DeriveError, DeriveResult};
use crate::pql::{Density, Session, Split, MODEL_VS_DATA};
use crate::vismel::{Axis, ColorEncoding, ColorMap, Layer, Layout, Query};

/// Derives the joint density query of an atomic query.
///
/// Both axes must be occupied; otherwise the facet is skipped with
/// [`DeriveError::NothingToDo`].
pub fn derive_joint(query: &Query, session: &mut Session, resolution: u32) -> DeriveResult<Query> {
    if !query.is_atomic() {
        return Err(DeriveError::NotAtomic(
            "joint density needs one symbolic entity per axis".to_string(),
        ));
    }
    let (Some(row), Some(col)) = (query.axis_entity(Axis::Rows), query.axis_entity(Axis::Cols))
    else {
        return Err(DeriveError::NothingToDo(
            "joint density needs both axes".to_string(),
        ));
    };

    let x_field = col.kind().primary_field();
    let y_field = row.kind().primary_field();
    let x = session.intern_kind(Split::for_density(x_field, resolution)?);
    let y = session.intern_kind(Split::for_density(y_field, resolution)?);
    let density = session.intern_kind(Density::new(vec![x_field.clone(), y_field.clone()])?);

    let filters = query
        .filters()
        .into_iter()
        .filter(|f| f.as_filter().map_or(true, |f| f.field.name != MODEL_VS_DATA))
        .collect();
    let layer = Layer {
        filters,
        color: Some(ColorMap::new(density, ColorEncoding::Lightness)),
        ..Layer::default()
    };

    Ok(Query::new(
        query.source.clone(),
        Layout::new(vec![y], vec![x]),
        vec![layer],
    )?)
}
