//! Normalized set form
//!
//! Normalizing an [`Expression`] yields a flat list of [`Cell`]s. Every cell
//! binds each discrete operand to one concrete value and keeps the other
//! operands symbolic.

use std::fmt;

use super::errors::{AlgebraError, AlgebraResult};
use super::expr::{expansion_values, Expression};
use crate::pql::EntityRef;

/// One conjunct of a cell
#[derive(Debug, Clone)]
pub enum CellItem {
    /// A discrete operand bound to one of its values
    Value { entity: EntityRef, value: String },
    /// An operand that stays symbolic
    Symbol(EntityRef),
}

impl CellItem {
    pub fn entity(&self) -> &EntityRef {
        match self {
            CellItem::Value { entity, .. } => entity,
            CellItem::Symbol(entity) => entity,
        }
    }
}

/// One row of the normalized set form
#[derive(Debug, Clone, Default)]
pub struct Cell {
    items: Vec<CellItem>,
}

impl Cell {
    pub fn items(&self) -> &[CellItem] {
        &self.items
    }

    /// Discrete bindings of this cell, in operand order
    pub fn bindings(&self) -> impl Iterator<Item = (&EntityRef, &str)> {
        self.items.iter().filter_map(|item| match item {
            CellItem::Value { entity, value } => Some((entity, value.as_str())),
            CellItem::Symbol(_) => None,
        })
    }

    /// The single symbolic entity of this cell, if any
    pub fn symbol(&self) -> AlgebraResult<Option<&EntityRef>> {
        let symbols: Vec<&EntityRef> = self
            .items
            .iter()
            .filter_map(|item| match item {
                CellItem::Symbol(e) => Some(e),
                CellItem::Value { .. } => None,
            })
            .collect();
        match symbols.len() {
            0 => Ok(None),
            1 => Ok(Some(symbols[0])),
            count => Err(AlgebraError::TooManyContinuous {
                count,
                names: symbols
                    .iter()
                    .map(|e| e.yields())
                    .collect::<Vec<_>>()
                    .join(","),
            }),
        }
    }

    fn joined(&self, other: &Cell) -> Cell {
        let mut items = self.items.clone();
        items.extend(other.items.iter().cloned());
        Cell { items }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .items
            .iter()
            .map(|item| match item {
                CellItem::Value { entity, value } => format!("{}={}", entity.yields(), value),
                CellItem::Symbol(entity) => entity.yields(),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Rows of a single operand
fn operand_cells(entity: &EntityRef) -> Vec<Cell> {
    match expansion_values(entity) {
        Some(values) => values
            .into_iter()
            .map(|value| Cell {
                items: vec![CellItem::Value {
                    entity: entity.clone(),
                    value,
                }],
            })
            .collect(),
        None => vec![Cell {
            items: vec![CellItem::Symbol(entity.clone())],
        }],
    }
}

/// Reduces an expression to its normalized set form.
///
/// `*` is the Cartesian product of the operands' rows, `+` concatenates.
/// An empty expression has no rows. Crossing with an operand that has no
/// rows is an error.
pub fn normalize(expr: &Expression) -> AlgebraResult<Vec<Cell>> {
    let mut nsf = Vec::new();
    for group in expr.product_groups() {
        let crossed = group.len() > 1;
        let mut rows: Option<Vec<Cell>> = None;
        for operand in group {
            let cells = operand_cells(operand);
            if cells.is_empty() && crossed {
                return Err(AlgebraError::DegenerateOperand(operand.yields()));
            }
            rows = Some(match rows {
                None => cells,
                Some(left) => left
                    .iter()
                    .flat_map(|l| cells.iter().map(move |r| l.joined(r)))
                    .collect(),
            });
        }
        nsf.extend(rows.unwrap_or_default());
    }
    Ok(nsf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::{Aggregation, AggregationMethod, Entity, Split};
    use crate::schema::Field;
    use std::sync::Arc;

    #[test]
    fn test_split_times_aggregation() {
        let sex = Field::categorical("sex", ["F", "M"], "m").unwrap();
        let age = Field::numerical("age", 0.0, 1.0, "m").unwrap();
        let split = Entity::new(Split::default_for(&sex));
        let avg = Entity::new(Aggregation::new(vec![age], AggregationMethod::Average, "age").unwrap());

        let expr = Expression::build(&[split, avg.clone()]).unwrap();
        let nsf = normalize(&expr).unwrap();
        assert_eq!(nsf.len(), 2);
        assert_eq!(nsf[0].to_string(), "[sex=F, age]");
        assert_eq!(nsf[1].to_string(), "[sex=M, age]");
        for cell in &nsf {
            assert!(Arc::ptr_eq(cell.symbol().unwrap().unwrap(), &avg));
        }
    }

    #[test]
    fn test_empty_expression() {
        assert!(normalize(&Expression::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_degenerate_operand() {
        let empty = Field::categorical("none", Vec::<String>::new(), "m").unwrap();
        let sex = Field::categorical("sex", ["F", "M"], "m").unwrap();
        let expr = Expression::build(&[
            Entity::new(Split::default_for(&sex)),
            Entity::new(Split::default_for(&empty)),
        ])
        .unwrap();
        assert!(matches!(
            normalize(&expr),
            Err(AlgebraError::DegenerateOperand(name)) if name == "none"
        ));

        // alone, an empty operand simply has no rows
        let alone = Expression::build(&[Entity::new(Split::default_for(&empty))]).unwrap();
        assert!(normalize(&alone).unwrap().is_empty());
    }

    #[test]
    fn test_two_symbols_in_one_cell() {
        let age = Field::numerical("age", 0.0, 1.0, "m").unwrap();
        let income = Field::numerical("income", 0.0, 1.0, "m").unwrap();
        let expr = Expression::build(&[
            Entity::new(Split::default_for(&age)),
            Entity::new(Split::default_for(&income)),
        ])
        .unwrap();
        let nsf = normalize(&expr).unwrap();
        assert_eq!(nsf.len(), 1);
        assert!(matches!(
            nsf[0].symbol(),
            Err(AlgebraError::TooManyContinuous { count: 2, .. })
        ));
    }
}
