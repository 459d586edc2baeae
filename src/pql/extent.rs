//! Value ranges attached to query entities
//!
//! An [`Extent`] is either the set of observed categorical values or a
//! closed numeric interval. Extents are unioned across a whole result grid
//! and then padded for display.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::schema::{DataType, Domain};

/// Default display padding, relative to the width of an interval
pub const DEFAULT_PADDING: f64 = 0.05;

/// Observed or display range of an entity's yield
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extent {
    /// Sorted set of categorical values
    Discrete(BTreeSet<String>),
    /// Closed numeric interval
    Continuous { low: f64, high: f64 },
}

impl Extent {
    /// Creates a discrete extent from any values
    pub fn discrete<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Extent::Discrete(values.into_iter().map(Into::into).collect())
    }

    /// Creates a continuous extent, ordering the bounds
    pub fn continuous(a: f64, b: f64) -> Self {
        Extent::Continuous {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Extent covering a bounded domain
    pub fn from_domain(domain: &Domain) -> Option<Self> {
        match domain {
            Domain::Discrete(Some(values)) => Some(Extent::discrete(values.iter().cloned())),
            Domain::Numeric { low, high } if low.is_finite() && high.is_finite() => {
                Some(Extent::continuous(*low, *high))
            }
            _ => None,
        }
    }

    /// Data type of the values in this extent
    pub fn data_type(&self) -> DataType {
        match self {
            Extent::Discrete(_) => DataType::Categorical,
            Extent::Continuous { .. } => DataType::Numerical,
        }
    }

    /// Returns true for discrete extents
    pub fn is_discrete(&self) -> bool {
        matches!(self, Extent::Discrete(_))
    }

    /// Union with another extent of the same kind.
    ///
    /// Returns `None` if the kinds differ.
    pub fn union(&self, other: &Extent) -> Option<Extent> {
        match (self, other) {
            (Extent::Discrete(a), Extent::Discrete(b)) => {
                Some(Extent::Discrete(a.union(b).cloned().collect()))
            }
            (
                Extent::Continuous { low: l1, high: h1 },
                Extent::Continuous { low: l2, high: h2 },
            ) => Some(Extent::Continuous {
                low: l1.min(*l2),
                high: h1.max(*h2),
            }),
            _ => None,
        }
    }

    /// Display form of the extent.
    ///
    /// A degenerate interval `[v, v]` grows by `|v| * pct` on both sides, or
    /// becomes `[-1, 1]` for `v = 0`. Other intervals are padded by
    /// `pct * (high - low)` on both ends. Discrete extents are unchanged.
    pub fn normalized(&self, pct: f64) -> Extent {
        match self {
            Extent::Discrete(_) => self.clone(),
            Extent::Continuous { low, high } if low == high => {
                let v = *low;
                if v == 0.0 {
                    Extent::Continuous {
                        low: -1.0,
                        high: 1.0,
                    }
                } else {
                    let pad = v.abs() * pct;
                    Extent::Continuous {
                        low: v - pad,
                        high: v + pad,
                    }
                }
            }
            Extent::Continuous { low, high } => {
                let pad = (high - low) * pct;
                Extent::Continuous {
                    low: low - pad,
                    high: high + pad,
                }
            }
        }
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Discrete(values) => {
                let v: Vec<&str> = values.iter().map(String::as_str).collect();
                write!(f, "{{{}}}", v.join(","))
            }
            Extent::Continuous { low, high } => write!(f, "[{}, {}]", low, high),
        }
    }
}
