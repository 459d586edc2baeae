//! Template expansion
//!
//! A query whose axes hold discrete splits or several entities is a
//! template for a grid of atomic queries. Each row cell of the rows NSF is
//! combined with each cell of the cols NSF:
//!
//! - every discrete binding `field = value` becomes an `equals` filter, and
//!   an `identity` split on that field is added to the details unless the
//!   layer already splits by it,
//! - the symbolic entity of the cell (if any) becomes the axis entity.
//!
//! An empty axis contributes one cell with nothing on that axis.

use super::errors::QueryResult;
use super::query::{Layer, Layout, Query};
use crate::algebra::{normalize, AlgebraError, Cell};
use crate::pql::{Filter, Session, Split, SplitMethod};
use crate::schema::FieldRef;
use std::sync::Arc;

/// Row-major grid of atomic queries
#[derive(Debug, Clone)]
pub struct QueryGrid {
    rows: Vec<Cell>,
    cols: Vec<Cell>,
    cells: Vec<Query>,
}

impl QueryGrid {
    /// Number of grid rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns
    pub fn width(&self) -> usize {
        self.cols.len()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Query> {
        if row >= self.height() || col >= self.width() {
            return None;
        }
        self.cells.get(row * self.width() + col)
    }

    pub fn cells(&self) -> &[Query] {
        &self.cells
    }

    /// NSF of the rows axis (one empty cell if the axis is empty)
    pub fn row_cells(&self) -> &[Cell] {
        &self.rows
    }

    pub fn col_cells(&self) -> &[Cell] {
        &self.cols
    }

    /// Cells with their grid position
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Query)> {
        let width = self.width().max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, q)| (i / width, i % width, q))
    }
}

/// Expands `query` into its grid of atomic queries.
///
/// Fails with [`AlgebraError::CellCapExceeded`] if the grid would have more
/// than `max_cells` cells.
pub fn expand(query: &Query, session: &mut Session, max_cells: usize) -> QueryResult<QueryGrid> {
    let rows_expr = query.layout.rows_expression()?;
    let cols_expr = query.layout.cols_expression()?;

    let cells = rows_expr
        .row_count()
        .max(1)
        .saturating_mul(cols_expr.row_count().max(1));
    if cells > max_cells {
        return Err(AlgebraError::CellCapExceeded {
            cells,
            limit: max_cells,
        }
        .into());
    }

    let rows = or_single(normalize(&rows_expr)?);
    let cols = or_single(normalize(&cols_expr)?);

    let mut grid = Vec::with_capacity(rows.len() * cols.len());
    for r in &rows {
        for c in &cols {
            grid.push(atomic_query(query, r, c, session)?);
        }
    }

    Ok(QueryGrid {
        rows,
        cols,
        cells: grid,
    })
}

fn or_single(cells: Vec<Cell>) -> Vec<Cell> {
    if cells.is_empty() {
        vec![Cell::default()]
    } else {
        cells
    }
}

fn atomic_query(
    base: &Query,
    row: &Cell,
    col: &Cell,
    session: &mut Session,
) -> QueryResult<Query> {
    let layout = Layout::new(
        row.symbol()?.cloned().into_iter().collect(),
        col.symbol()?.cloned().into_iter().collect(),
    );

    let mut bindings: Vec<(FieldRef, String)> = Vec::new();
    for (entity, value) in row.bindings().chain(col.bindings()) {
        if let Some(split) = entity.as_split() {
            bindings.push((Arc::clone(&split.field), value.to_string()));
        }
    }

    let mut layers: Vec<Layer> = Vec::with_capacity(base.layers.len());
    for layer in &base.layers {
        let mut layer = layer.clone();
        for (field, value) in &bindings {
            let filter = session.intern_kind(Filter::equals(field, value)?);
            layer.filters.push(filter);
            if !layer.splits_field(&field.name) {
                let split = Split::new(Arc::clone(field), SplitMethod::Identity, vec![])?;
                layer.details.push(session.intern_kind(split));
            }
        }
        layers.push(layer);
    }

    Query::new(base.source.clone(), layout, layers)
}
