//! JSON form of a declarative query
//!
//! ```json
//! {
//!   "from": "census",
//!   "rows": [{"kind": "aggregation", "fields": ["age"], "method": "average"}],
//!   "cols": [{"kind": "split", "field": "sex"}],
//!   "filters": [{"kind": "filter", "field": "income", "value": [0, 5000]}],
//!   "color": {"kind": "split", "field": "education", "encoding": "hue"},
//!   "details": []
//! }
//! ```
//!
//! Fields are referenced by name and resolved against a model header. Every
//! resolved entity is interned in the evaluation session.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use super::query::{ChannelMap, ColorEncoding, ColorMap, Layer, Layout, Query};
use crate::pql::{
    Aggregation, AggregationMethod, Density, DensityMethod, EntityRef, Filter, FilterMethod,
    Session, Split, SplitMethod,
};
use crate::schema::{parse_domain, FieldRef, ModelHeader};

/// One entity, fields given by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntitySpec {
    Split {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<u32>,
    },
    Aggregation {
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        yields: Option<String>,
    },
    Density {
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        method: Option<String>,
    },
    Filter {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
        #[serde(default)]
        value: Value,
    },
}

/// Entity on a color channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    #[serde(flatten)]
    pub entity: EntitySpec,
    #[serde(default)]
    pub encoding: ColorEncoding,
}

/// A declarative query with fields referenced by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default)]
    pub rows: Vec<EntitySpec>,
    #[serde(default)]
    pub cols: Vec<EntitySpec>,
    #[serde(default)]
    pub filters: Vec<EntitySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<EntitySpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<EntitySpec>,
    #[serde(default)]
    pub details: Vec<EntitySpec>,
}

impl QuerySpec {
    pub fn parse_str(content: &str) -> QueryResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| QueryError::Malformed(format!("Invalid JSON: {}", e)))
    }

    pub fn load(path: &Path) -> QueryResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            QueryError::Malformed(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse_str(&content)
    }

    /// Builds the query tree. Entities are interned in `session`, so equal
    /// specs within one session resolve to the same instance.
    pub fn resolve(&self, header: &ModelHeader, session: &mut Session) -> QueryResult<Query> {
        if let Some(from) = &self.from {
            if from != header.model() {
                return Err(QueryError::SourceMismatch {
                    expected: header.model().to_string(),
                    found: from.clone(),
                });
            }
        }
        let resolve_all = |specs: &[EntitySpec], session: &mut Session| {
            specs
                .iter()
                .map(|s| s.resolve(header, session))
                .collect::<QueryResult<Vec<_>>>()
        };
        let rows = resolve_all(&self.rows, session)?;
        let cols = resolve_all(&self.cols, session)?;
        let filters = resolve_all(&self.filters, session)?;
        let details = resolve_all(&self.details, session)?;

        if let Some(e) = filters.iter().find(|e| !e.is_filter()) {
            return Err(QueryError::Malformed(format!(
                "'{}' is not a filter",
                e.yields()
            )));
        }

        let color = match &self.color {
            Some(c) => Some(ColorMap::new(c.entity.resolve(header, session)?, c.encoding)),
            None => None,
        };
        let shape = match &self.shape {
            Some(s) => Some(ChannelMap::new(s.resolve(header, session)?)),
            None => None,
        };
        let size = match &self.size {
            Some(s) => Some(ChannelMap::new(s.resolve(header, session)?)),
            None => None,
        };

        let layer = Layer {
            filters,
            color,
            shape,
            size,
            details,
        };
        Query::new(header.model(), Layout::new(rows, cols), vec![layer])
    }
}

impl EntitySpec {
    pub fn resolve(&self, header: &ModelHeader, session: &mut Session) -> QueryResult<EntityRef> {
        let entity = match self {
            EntitySpec::Split {
                field,
                method,
                args,
            } => {
                let field = header.require(field)?;
                let split = match method {
                    None => Split::default_for(field),
                    Some(m) => {
                        let method = SplitMethod::parse(m)?;
                        let args = if args.is_empty() && method == SplitMethod::EquiInterval {
                            vec![crate::pql::DEFAULT_SPLIT_BUCKETS]
                        } else {
                            args.clone()
                        };
                        Split::new(Arc::clone(field), method, args)?
                    }
                };
                session.intern_kind(split)
            }
            EntitySpec::Aggregation {
                fields,
                method,
                yields,
            } => {
                let fields = require_all(header, fields)?;
                let method = match method {
                    Some(m) => AggregationMethod::parse(m)?,
                    None => AggregationMethod::Maximum,
                };
                let yields = match yields {
                    Some(y) => y.clone(),
                    None => fields
                        .first()
                        .map(|f| f.name.clone())
                        .unwrap_or_default(),
                };
                session.intern_kind(Aggregation::new(fields, method, yields)?)
            }
            EntitySpec::Density { fields, method } => {
                let fields = require_all(header, fields)?;
                let method = match method {
                    Some(m) => DensityMethod::parse(m)?,
                    None => DensityMethod::Density,
                };
                session.intern_kind(Density::with_method(fields, method)?)
            }
            EntitySpec::Filter {
                field,
                operator,
                value,
            } => {
                let field = header.require(field)?;
                let filter = if value.is_null() {
                    Filter::default_for(field)
                } else {
                    let args = parse_domain(&field.name, field.data_type, value)?;
                    let method = match operator {
                        Some(op) => FilterMethod::parse(op)?,
                        None if args.is_singular() => FilterMethod::Equals,
                        None => FilterMethod::In,
                    };
                    Filter::new(Arc::clone(field), method, args)?
                };
                session.intern_kind(filter)
            }
        };
        Ok(entity)
    }
}

fn require_all(header: &ModelHeader, names: &[String]) -> QueryResult<Vec<FieldRef>> {
    names
        .iter()
        .map(|n| header.require(n).map(Arc::clone).map_err(QueryError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::{AggregationMethod, FilterMethod};
    use serde_json::json;

    fn header() -> ModelHeader {
        ModelHeader::from_json(
            "census",
            &json!({"fields": [
                {"name": "sex", "dtype": "string", "domain": ["F", "M"], "extent": ["F", "M"]},
                {"name": "age", "dtype": "numerical", "domain": null, "extent": [18, 90]},
                {"name": "income", "dtype": "numerical", "domain": null, "extent": [0, 9000]}
            ]}),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_query() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "from": "census",
            "rows": [{"kind": "aggregation", "fields": ["age"], "method": "average"}],
            "cols": [{"kind": "split", "field": "sex"}],
            "filters": [{"kind": "filter", "field": "income", "value": [0, 5000]}],
            "color": {"kind": "split", "field": "sex", "encoding": "lightness"}
        }))
        .unwrap();

        let mut session = Session::new();
        let q = spec.resolve(&header(), &mut session).unwrap();
        assert_eq!(q.source, "census");

        let avg = q.layout.rows[0].as_aggregation().unwrap();
        assert_eq!(avg.method, AggregationMethod::Average);
        assert_eq!(avg.yields, "age");

        let filter = q.layer().filters[0].as_filter().unwrap();
        assert_eq!(filter.method, FilterMethod::In);

        // the same split spec on cols and color resolves to one instance
        let color = q.layer().color.as_ref().unwrap();
        assert!(Arc::ptr_eq(&color.entity, &q.layout.cols[0]));
        assert_eq!(color.encoding, ColorEncoding::Lightness);
        assert_eq!(q.entities().len(), 3);
    }

    #[test]
    fn test_singular_filter_is_equals() {
        let spec = EntitySpec::Filter {
            field: "sex".into(),
            operator: None,
            value: json!("F"),
        };
        let e = spec.resolve(&header(), &mut Session::new()).unwrap();
        assert_eq!(e.as_filter().unwrap().method, FilterMethod::Equals);
    }

    #[test]
    fn test_unknown_field() {
        let spec = QuerySpec {
            rows: vec![EntitySpec::Split {
                field: "height".into(),
                method: None,
                args: vec![],
            }],
            ..QuerySpec::default()
        };
        let err = spec.resolve(&header(), &mut Session::new()).unwrap_err();
        assert_eq!(err.code(), "VIS_FIELD_UNKNOWN");
    }

    #[test]
    fn test_source_mismatch() {
        let spec = QuerySpec {
            from: Some("iris".into()),
            ..QuerySpec::default()
        };
        let err = spec.resolve(&header(), &mut Session::new()).unwrap_err();
        assert_eq!(err.code(), "VIS_QUERY_SOURCE_MISMATCH");
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            QuerySpec::parse_str("{\"rows\": 1}"),
            Err(QueryError::Malformed(_))
        ));
    }
}
