//! Table algebra expressions
//!
//! An axis holds an ordered list of entities. [`Expression::build`] joins
//! neighbours with `+` when both are measures (aggregations or densities)
//! and with `*` otherwise. `*` binds tighter than `+`.

use std::fmt;
use std::sync::Arc;

use super::errors::{AlgebraError, AlgebraResult};
use crate::pql::EntityRef;

/// Binary operator between two axis entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `*`: Cartesian product
    Cross,
    /// `+`: concatenation
    Concat,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Cross => '*',
            Operator::Concat => '+',
        }
    }
}

/// `e0 op0 e1 op1 ... en`. Always holds one operator less than entities.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    operands: Vec<EntityRef>,
    operators: Vec<Operator>,
}

impl Expression {
    /// Builds the expression for an axis
    pub fn build(entities: &[EntityRef]) -> AlgebraResult<Self> {
        if let Some(filter) = entities.iter().find(|e| e.is_filter()) {
            return Err(AlgebraError::FilterOnAxis(filter.yields()));
        }
        let operators = entities
            .windows(2)
            .map(|pair| {
                if pair[0].is_measure() && pair[1].is_measure() {
                    Operator::Concat
                } else {
                    Operator::Cross
                }
            })
            .collect();
        Ok(Self {
            operands: entities.to_vec(),
            operators,
        })
    }

    /// Empty expression
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn operands(&self) -> &[EntityRef] {
        &self.operands
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operands.len()
    }

    /// Operands grouped by `+`. Each group is a chain of `*`.
    pub fn product_groups(&self) -> Vec<&[EntityRef]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for (i, op) in self.operators.iter().enumerate() {
            if *op == Operator::Concat {
                groups.push(&self.operands[start..=i]);
                start = i + 1;
            }
        }
        if start < self.operands.len() {
            groups.push(&self.operands[start..]);
        }
        groups
    }

    /// Number of rows the normal form will have, without building it
    pub fn row_count(&self) -> usize {
        self.product_groups()
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(operand_rows)
                    .fold(1usize, |acc, n| acc.saturating_mul(n))
            })
            .fold(0usize, |acc, n| acc.saturating_add(n))
    }

    /// True if this expression holds exactly this entity instance
    pub fn contains(&self, entity: &EntityRef) -> bool {
        self.operands.iter().any(|e| Arc::ptr_eq(e, entity))
    }
}

/// Number of NSF rows a single operand contributes
fn operand_rows(entity: &EntityRef) -> usize {
    match expansion_values(entity) {
        Some(values) => values.len(),
        None => 1,
    }
}

/// Values a template-expanding operand iterates over. `None` for operands
/// that stay symbolic.
pub fn expansion_values(entity: &EntityRef) -> Option<Vec<String>> {
    let split = entity.as_split()?;
    if !split.field.is_discrete() {
        return None;
    }
    Some(
        split
            .field
            .bounded_domain()
            .values()
            .map(|v| v.to_vec())
            .unwrap_or_default(),
    )
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.operators[i - 1].symbol())?;
            }
            write!(f, "{}", e.yields())?;
        }
        Ok(())
    }
}
