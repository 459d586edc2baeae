//! Declarative query tree
//!
//! A [`Query`] names one model, places entities on the two layout axes and
//! carries one or more [`Layer`]s of filters and visual channels.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::{QueryError, QueryResult};
use crate::algebra::{expansion_values, Expression};
use crate::pql::EntityRef;
use crate::schema::DataType;

/// How a color channel encodes its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorEncoding {
    #[default]
    Hue,
    Lightness,
}

/// Scale family picked from the data type of a channel's entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleFamily {
    Ordinal,
    Sequential,
}

/// A non-positional channel (shape, size) bound to an entity
#[derive(Debug, Clone)]
pub struct ChannelMap {
    pub entity: EntityRef,
}

impl ChannelMap {
    pub fn new(entity: EntityRef) -> Self {
        Self { entity }
    }

    pub fn scale(&self) -> ScaleFamily {
        scale_for(self.entity.yield_data_type())
    }
}

/// Color channel
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub entity: EntityRef,
    pub encoding: ColorEncoding,
}

impl ColorMap {
    pub fn new(entity: EntityRef, encoding: ColorEncoding) -> Self {
        Self { entity, encoding }
    }

    pub fn scale(&self) -> ScaleFamily {
        scale_for(self.entity.yield_data_type())
    }
}

fn scale_for(data_type: DataType) -> ScaleFamily {
    match data_type {
        DataType::Categorical => ScaleFamily::Ordinal,
        DataType::Numerical => ScaleFamily::Sequential,
    }
}

/// Entities placed on the row and column axes
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub rows: Vec<EntityRef>,
    pub cols: Vec<EntityRef>,
}

/// Which layout axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Rows => "rows",
            Axis::Cols => "cols",
        }
    }
}

impl Layout {
    pub fn new(rows: Vec<EntityRef>, cols: Vec<EntityRef>) -> Self {
        Self { rows, cols }
    }

    pub fn axis(&self, axis: Axis) -> &[EntityRef] {
        match axis {
            Axis::Rows => &self.rows,
            Axis::Cols => &self.cols,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut Vec<EntityRef> {
        match axis {
            Axis::Rows => &mut self.rows,
            Axis::Cols => &mut self.cols,
        }
    }

    pub fn rows_expression(&self) -> QueryResult<Expression> {
        Ok(Expression::build(&self.rows)?)
    }

    pub fn cols_expression(&self) -> QueryResult<Expression> {
        Ok(Expression::build(&self.cols)?)
    }
}

/// Filters and channel mappings
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub filters: Vec<EntityRef>,
    pub color: Option<ColorMap>,
    pub shape: Option<ChannelMap>,
    pub size: Option<ChannelMap>,
    pub details: Vec<EntityRef>,
}

impl Layer {
    /// Entities on color, shape, size and details, in that order
    pub fn channel_entities(&self) -> Vec<EntityRef> {
        let mut out = Vec::new();
        if let Some(c) = &self.color {
            out.push(c.entity.clone());
        }
        if let Some(s) = &self.shape {
            out.push(s.entity.clone());
        }
        if let Some(s) = &self.size {
            out.push(s.entity.clone());
        }
        out.extend(self.details.iter().cloned());
        out
    }

    /// True if a split on `field` is used on a channel or in details
    pub fn splits_field(&self, field: &str) -> bool {
        self.channel_entities()
            .iter()
            .filter_map(|e| e.as_split())
            .any(|s| s.field.name == field)
    }
}

/// A declarative visualization query
#[derive(Debug, Clone)]
pub struct Query {
    pub source: String,
    pub layout: Layout,
    pub layers: Vec<Layer>,
}

impl Query {
    pub fn new(source: impl Into<String>, layout: Layout, layers: Vec<Layer>) -> QueryResult<Self> {
        if layers.is_empty() {
            return Err(QueryError::NoLayer);
        }
        Expression::build(&layout.rows)?;
        Expression::build(&layout.cols)?;
        Ok(Self {
            source: source.into(),
            layout,
            layers,
        })
    }

    /// First layer. Every query has at least one.
    pub fn layer(&self) -> &Layer {
        &self.layers[0]
    }

    /// All entities of the query, each instance once: rows, cols, then per
    /// layer filters, color, shape, size and details.
    pub fn entities(&self) -> Vec<EntityRef> {
        let mut all: Vec<EntityRef> = Vec::new();
        let mut push = |e: &EntityRef| {
            if !all.iter().any(|x| Arc::ptr_eq(x, e)) {
                all.push(e.clone());
            }
        };
        self.layout.rows.iter().for_each(&mut push);
        self.layout.cols.iter().for_each(&mut push);
        for layer in &self.layers {
            layer.filters.iter().for_each(&mut push);
            layer.channel_entities().iter().for_each(&mut push);
        }
        all
    }

    /// Filters of all layers
    pub fn filters(&self) -> Vec<EntityRef> {
        self.layers
            .iter()
            .flat_map(|l| l.filters.iter().cloned())
            .collect()
    }

    /// Entities on channels and details of all layers
    pub fn channel_entities(&self) -> Vec<EntityRef> {
        self.layers
            .iter()
            .flat_map(|l| l.channel_entities())
            .collect()
    }

    /// The single entity on an axis of an atomic query
    pub fn axis_entity(&self, axis: Axis) -> Option<&EntityRef> {
        self.layout.axis(axis).first()
    }

    /// True if each axis holds at most one entity
    pub fn has_flat_layout(&self) -> bool {
        self.layout.rows.len() <= 1 && self.layout.cols.len() <= 1
    }

    /// True if no axis needs template expansion: the layout is flat and the
    /// axis entities stay symbolic.
    pub fn is_atomic(&self) -> bool {
        self.has_flat_layout()
            && self
                .layout
                .rows
                .iter()
                .chain(self.layout.cols.iter())
                .all(|e| expansion_values(e).is_none())
    }
}
