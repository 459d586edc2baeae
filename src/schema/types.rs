//! Field and domain types
//!
//! A [`Field`] is one named dimension of a model. Fields are immutable once
//! constructed and shared via [`FieldRef`]; query entities only reference them.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};

/// Data type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Categorical values (strings)
    #[serde(rename = "string")]
    Categorical,
    /// Real-valued numbers
    #[serde(rename = "numerical")]
    Numerical,
}

impl DataType {
    /// Returns the wire name of the data type
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Categorical => "string",
            DataType::Numerical => "numerical",
        }
    }

    /// Returns true for categorical data
    pub fn is_discrete(&self) -> bool {
        matches!(self, DataType::Categorical)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set of legal values of a field, or a constraint on them.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Discrete set of values. `None` is the unbounded domain.
    Discrete(Option<Vec<String>>),
    /// Closed interval. Infinite bounds mark an unbounded side.
    Numeric { low: f64, high: f64 },
}

impl Domain {
    /// Creates a bounded discrete domain
    pub fn discrete<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Domain::Discrete(Some(values.into_iter().map(Into::into).collect()))
    }

    /// Creates a numeric interval
    pub fn numeric(low: f64, high: f64) -> Self {
        Domain::Numeric { low, high }
    }

    /// Creates the unbounded domain for the given data type
    pub fn unbounded(data_type: DataType) -> Self {
        match data_type {
            DataType::Categorical => Domain::Discrete(None),
            DataType::Numerical => Domain::Numeric {
                low: f64::NEG_INFINITY,
                high: f64::INFINITY,
            },
        }
    }

    /// Returns the data type this domain can hold
    pub fn data_type(&self) -> DataType {
        match self {
            Domain::Discrete(_) => DataType::Categorical,
            Domain::Numeric { .. } => DataType::Numerical,
        }
    }

    /// Returns true if any side of the domain is unbounded
    pub fn is_unbounded(&self) -> bool {
        match self {
            Domain::Discrete(values) => values.is_none(),
            Domain::Numeric { low, high } => low.is_infinite() || high.is_infinite(),
        }
    }

    /// Returns true if the domain holds exactly one value
    pub fn is_singular(&self) -> bool {
        match self {
            Domain::Discrete(Some(values)) => values.len() == 1,
            Domain::Discrete(None) => false,
            Domain::Numeric { low, high } => low == high,
        }
    }

    /// Returns the values of a bounded discrete domain
    pub fn values(&self) -> Option<&[String]> {
        match self {
            Domain::Discrete(Some(values)) => Some(values),
            _ => None,
        }
    }

    /// Union of two domains of the same kind
    pub fn union(&self, other: &Domain) -> SchemaResult<Domain> {
        match (self, other) {
            (Domain::Discrete(None), Domain::Discrete(_))
            | (Domain::Discrete(_), Domain::Discrete(None)) => Ok(Domain::Discrete(None)),
            (Domain::Discrete(Some(a)), Domain::Discrete(Some(b))) => {
                let mut values = a.clone();
                for v in b {
                    if !values.contains(v) {
                        values.push(v.clone());
                    }
                }
                Ok(Domain::Discrete(Some(values)))
            }
            (Domain::Numeric { low: l1, high: h1 }, Domain::Numeric { low: l2, high: h2 }) => {
                Ok(Domain::numeric(l1.min(*l2), h1.max(*h2)))
            }
            _ => Err(SchemaError::domain_mismatch(
                "cannot unite a discrete and a numeric domain",
            )),
        }
    }

    /// Intersection of two domains of the same kind
    pub fn intersection(&self, other: &Domain) -> SchemaResult<Domain> {
        match (self, other) {
            (Domain::Discrete(None), d @ Domain::Discrete(_))
            | (d @ Domain::Discrete(_), Domain::Discrete(None)) => Ok(d.clone()),
            (Domain::Discrete(Some(a)), Domain::Discrete(Some(b))) => Ok(Domain::Discrete(
                Some(a.iter().filter(|v| b.contains(v)).cloned().collect()),
            )),
            (Domain::Numeric { low: l1, high: h1 }, Domain::Numeric { low: l2, high: h2 }) => {
                Ok(Domain::numeric(l1.max(*l2), h1.min(*h2)))
            }
            _ => Err(SchemaError::domain_mismatch(
                "cannot intersect a discrete and a numeric domain",
            )),
        }
    }

    /// Replaces the unbounded parts of this domain by those of `extent`
    pub fn bounded(&self, extent: &Domain) -> SchemaResult<Domain> {
        match (self, extent) {
            (Domain::Discrete(None), Domain::Discrete(_)) => Ok(extent.clone()),
            (Domain::Discrete(Some(_)), Domain::Discrete(_)) => Ok(self.clone()),
            (Domain::Numeric { low, high }, Domain::Numeric { low: el, high: eh }) => {
                Ok(Domain::numeric(
                    if low.is_infinite() { *el } else { *low },
                    if high.is_infinite() { *eh } else { *high },
                ))
            }
            _ => Err(SchemaError::domain_mismatch(
                "cannot bound a domain by an extent of another kind",
            )),
        }
    }

    /// Wire representation used in filter clauses.
    ///
    /// Singular domains collapse to their only value. Unbounded numeric sides
    /// are written as `null`.
    pub fn to_json_value(&self) -> Value {
        match self {
            Domain::Discrete(None) => Value::Null,
            Domain::Discrete(Some(values)) if values.len() == 1 => Value::String(values[0].clone()),
            Domain::Discrete(Some(values)) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            Domain::Numeric { low, high } if low == high => number_or_null(*low),
            Domain::Numeric { low, high } => {
                Value::Array(vec![number_or_null(*low), number_or_null(*high)])
            }
        }
    }
}

fn number_or_null(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Discrete(None) => write!(f, "{{*}}"),
            Domain::Discrete(Some(values)) => write!(f, "{{{}}}", values.join(",")),
            Domain::Numeric { low, high } => write!(f, "[{},{}]", low, high),
        }
    }
}

/// A named dimension of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Unique name within the model
    pub name: String,
    /// Data type of the values
    pub data_type: DataType,
    /// Legal values
    pub domain: Domain,
    /// Typical value range, always bounded
    pub extent: Domain,
    /// Name of the model this field belongs to
    pub source: String,
}

/// Shared handle to an immutable field
pub type FieldRef = Arc<Field>;

impl Field {
    /// Creates a validated field.
    ///
    /// Rejects domains and extents whose kind disagrees with `data_type`,
    /// and unbounded extents.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        domain: Domain,
        extent: Domain,
        source: impl Into<String>,
    ) -> SchemaResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::invalid_field(name, "name must not be empty"));
        }
        if domain.data_type() != data_type {
            return Err(SchemaError::invalid_field(
                name,
                format!("domain {} does not fit data type {}", domain, data_type),
            ));
        }
        if extent.data_type() != data_type {
            return Err(SchemaError::invalid_field(
                name,
                format!("extent {} does not fit data type {}", extent, data_type),
            ));
        }
        if extent.is_unbounded() {
            return Err(SchemaError::unbounded_extent(name));
        }
        Ok(Self {
            name,
            data_type,
            domain,
            extent,
            source: source.into(),
        })
    }

    /// Shorthand for a categorical field whose domain equals its extent
    pub fn categorical<I, S>(name: &str, values: I, source: &str) -> SchemaResult<FieldRef>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domain = Domain::discrete(values);
        Field::new(name, DataType::Categorical, domain.clone(), domain, source).map(Arc::new)
    }

    /// Shorthand for a numerical field with an unbounded domain
    pub fn numerical(name: &str, low: f64, high: f64, source: &str) -> SchemaResult<FieldRef> {
        Field::new(
            name,
            DataType::Numerical,
            Domain::unbounded(DataType::Numerical),
            Domain::numeric(low, high),
            source,
        )
        .map(Arc::new)
    }

    /// Returns true for categorical fields
    pub fn is_discrete(&self) -> bool {
        self.data_type.is_discrete()
    }

    /// Domain bounded by the extent, i.e. the values splits iterate over
    pub fn bounded_domain(&self) -> Domain {
        // kinds were checked on construction
        self.domain
            .bounded(&self.extent)
            .unwrap_or_else(|_| self.extent.clone())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({}) domain = {}", self.name, self.data_type, self.domain)
    }
}
