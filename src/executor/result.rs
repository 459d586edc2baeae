//! Result tables
//!
//! A [`ResultTable`] is the typed form of one backend response. Column types
//! come from the entity owning the column, never from the payload.

use std::collections::HashMap;

use serde_json::Value;

use super::errors::{ExtentError, ExtentResult};
use crate::compiler::Compiled;
use crate::pql::{Entity, EntityId, EntityRef, Extent, ResponseTable};
use crate::schema::DataType;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Text(String),
    Number(f64),
    Missing,
}

impl Datum {
    fn convert(value: &Value, data_type: DataType, column: &str) -> ExtentResult<Datum> {
        let bad = || ExtentError::BadValue {
            column: column.to_string(),
            expected: data_type.as_str(),
            value: value.to_string(),
        };
        match (data_type, value) {
            (_, Value::Null) => Ok(Datum::Missing),
            (DataType::Categorical, Value::String(s)) => Ok(Datum::Text(s.clone())),
            (DataType::Categorical, Value::Number(n)) => Ok(Datum::Text(n.to_string())),
            (DataType::Categorical, Value::Bool(b)) => Ok(Datum::Text(b.to_string())),
            (DataType::Numerical, Value::Number(n)) => n.as_f64().map(Datum::Number).ok_or_else(bad),
            (DataType::Numerical, Value::String(s)) => {
                s.trim().parse::<f64>().map(Datum::Number).map_err(|_| bad())
            }
            _ => Err(bad()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Datum::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Typed result of one backend query
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    header: Vec<String>,
    rows: Vec<Vec<Datum>>,
    fu2idx: HashMap<EntityId, usize>,
    idx2fu: Vec<EntityRef>,
}

impl ResultTable {
    /// Converts a backend response using the column maps of `compiled`
    pub fn from_response(response: ResponseTable, compiled: &Compiled) -> ExtentResult<Self> {
        let columns = compiled.columns();
        if response.header.len() != columns.len() {
            return Err(ExtentError::ColumnMismatch {
                expected: columns.len(),
                found: response.header.len(),
            });
        }

        let mut rows = Vec::with_capacity(response.data.len());
        for (r, raw) in response.data.iter().enumerate() {
            if raw.len() != columns.len() {
                return Err(ExtentError::RowMismatch {
                    row: r,
                    expected: columns.len(),
                    found: raw.len(),
                });
            }
            let row = raw
                .iter()
                .zip(columns)
                .zip(&response.header)
                .map(|((v, e), name)| Datum::convert(v, e.yield_data_type(), name))
                .collect::<ExtentResult<Vec<_>>>()?;
            rows.push(row);
        }

        Ok(Self {
            header: response.header,
            rows,
            fu2idx: compiled.fu2idx().clone(),
            idx2fu: columns.to_vec(),
        })
    }

    /// Placeholder with the columns of `compiled` and no rows
    pub fn empty(compiled: &Compiled) -> Self {
        Self {
            header: compiled.columns().iter().map(|e| e.yields()).collect(),
            rows: Vec::new(),
            fu2idx: compiled.fu2idx().clone(),
            idx2fu: compiled.columns().to_vec(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<Datum>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.idx2fu.len()
    }

    pub fn fu2idx(&self) -> &HashMap<EntityId, usize> {
        &self.fu2idx
    }

    pub fn idx2fu(&self) -> &[EntityRef] {
        &self.idx2fu
    }

    pub fn column_of(&self, entity: &Entity) -> Option<usize> {
        self.fu2idx.get(&entity.id()).copied()
    }

    /// Values of column `idx`
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &Datum> {
        self.rows.iter().filter_map(move |r| r.get(idx))
    }

    /// Range of the values observed in column `idx`, ignoring missing
    /// values. `None` if the column is empty.
    pub fn observed_extent(&self, idx: usize) -> Option<Extent> {
        let entity = self.idx2fu.get(idx)?;
        if entity.has_discrete_yield() {
            let values: Vec<&str> = self.column(idx).filter_map(Datum::as_text).collect();
            if values.is_empty() {
                return None;
            }
            return Some(Extent::discrete(values));
        }
        let mut numbers = self
            .column(idx)
            .filter_map(Datum::as_number)
            .filter(|n| n.is_finite());
        let first = numbers.next()?;
        let (low, high) = numbers.fold((first, first), |(l, h), n| (l.min(n), h.max(n)));
        Some(Extent::continuous(low, high))
    }

    /// Published extents aligned to columns
    pub fn extent(&self) -> Vec<Option<&Extent>> {
        self.idx2fu.iter().map(|e| e.extent()).collect()
    }
}
