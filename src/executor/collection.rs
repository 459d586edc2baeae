//! Facet collections
//!
//! One collection per facet, holding the result tables of every cell of the
//! query grid in row-major order.

use super::result::ResultTable;
use crate::facets::Facet;

/// Result tables of one facet for one grid cell
#[derive(Debug, Clone)]
pub enum FacetTables {
    /// Aggregation, sample and joint density facets
    Single(ResultTable),
    /// Marginal densities along the row and the column axis
    Marginal { rows: ResultTable, cols: ResultTable },
}

impl FacetTables {
    pub fn tables(&self) -> Vec<&ResultTable> {
        match self {
            FacetTables::Single(t) => vec![t],
            FacetTables::Marginal { rows, cols } => vec![rows, cols],
        }
    }

    pub fn single(&self) -> Option<&ResultTable> {
        match self {
            FacetTables::Single(t) => Some(t),
            FacetTables::Marginal { .. } => None,
        }
    }
}

/// Grid of result tables for one facet
#[derive(Debug, Clone)]
pub struct FacetCollection {
    facet: Facet,
    height: usize,
    width: usize,
    active: bool,
    cells: Vec<FacetTables>,
}

impl FacetCollection {
    /// Collection of fetched tables. `cells` must hold `height * width`
    /// entries in row-major order.
    pub fn new(facet: Facet, height: usize, width: usize, cells: Vec<FacetTables>) -> Self {
        debug_assert_eq!(cells.len(), height * width);
        Self {
            facet,
            height,
            width,
            active: true,
            cells,
        }
    }

    /// Collection of a facet that was switched off. Holds placeholder tables
    /// of the right grid shape.
    pub fn inactive(facet: Facet, height: usize, width: usize, cells: Vec<FacetTables>) -> Self {
        Self {
            active: false,
            ..Self::new(facet, height, width, cells)
        }
    }

    pub fn facet(&self) -> Facet {
        self.facet
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&FacetTables> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells.get(row * self.width + col)
    }

    pub fn cells(&self) -> &[FacetTables] {
        &self.cells
    }

    /// All tables of all cells
    pub fn tables(&self) -> impl Iterator<Item = &ResultTable> {
        self.cells.iter().flat_map(|c| c.tables())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_access() {
        let cells = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    FacetTables::Single(ResultTable::default())
                } else {
                    FacetTables::Marginal {
                        rows: ResultTable::default(),
                        cols: ResultTable::default(),
                    }
                }
            })
            .collect();
        let c = FacetCollection::new(Facet::Marginals, 2, 3, cells);
        assert!(c.is_active());
        assert!(c.get(1, 0).unwrap().single().is_none());
        assert!(c.get(2, 0).is_none());
        assert_eq!(c.tables().count(), 9);
    }
}
