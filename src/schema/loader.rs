//! Model header loading
//!
//! A model header is the backend's description of a model's fields:
//!
//! ```json
//! {"fields": [{"name": "sex", "dtype": "string", "domain": ["F", "M"], "extent": ["F", "M"]},
//!             {"name": "age", "dtype": "numerical", "domain": [null, null], "extent": [18, 90]}]}
//! ```
//!
//! Fields are created once per header and shared by every query built on it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::errors::{SchemaError, SchemaResult};
use super::types::{DataType, Domain, Field, FieldRef};

#[derive(Debug, Deserialize)]
struct RawHeader {
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    dtype: DataType,
    #[serde(default)]
    domain: Value,
    extent: Value,
}

/// The fields of one model, in header order
#[derive(Debug, Clone)]
pub struct ModelHeader {
    model: String,
    fields: Vec<FieldRef>,
}

impl ModelHeader {
    /// Creates a header from already constructed fields
    pub fn new(model: impl Into<String>, fields: Vec<FieldRef>) -> Self {
        Self {
            model: model.into(),
            fields,
        }
    }

    /// Parses a header JSON value for the given model
    pub fn from_json(model: &str, value: &Value) -> SchemaResult<Self> {
        let raw: RawHeader = serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::malformed_header(format!("Invalid header: {}", e)))?;
        Self::from_raw(model, raw)
    }

    /// Parses a header from a JSON string
    pub fn parse_str(model: &str, content: &str) -> SchemaResult<Self> {
        let raw: RawHeader = serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed_header(format!("Invalid JSON: {}", e)))?;
        Self::from_raw(model, raw)
    }

    /// Loads a header file. The model is named after the file stem.
    pub fn load(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_header(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;
        let model = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("model");
        Self::parse_str(model, &content)
    }

    fn from_raw(model: &str, raw: RawHeader) -> SchemaResult<Self> {
        let mut fields: Vec<FieldRef> = Vec::with_capacity(raw.fields.len());
        for f in raw.fields {
            if fields.iter().any(|existing| existing.name == f.name) {
                return Err(SchemaError::malformed_header(format!(
                    "Duplicate field '{}'",
                    f.name
                )));
            }
            let domain = parse_domain(&f.name, f.dtype, &f.domain)?;
            let extent = parse_domain(&f.name, f.dtype, &f.extent)?;
            fields.push(Arc::new(Field::new(f.name, f.dtype, domain, extent, model)?));
        }
        Ok(Self {
            model: model.to_string(),
            fields,
        })
    }

    /// Name of the model
    pub fn model(&self) -> &str {
        &self.model
    }

    /// All fields in header order
    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldRef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a field by name, failing if it is unknown
    pub fn require(&self, name: &str) -> SchemaResult<&FieldRef> {
        self.field(name)
            .ok_or_else(|| SchemaError::unknown_field(name))
    }

    /// Returns the same header under another model name.
    ///
    /// Fields are re-created so that they point to the new source.
    pub fn renamed(&self, model: &str) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                Arc::new(Field {
                    source: model.to_string(),
                    ..Field::clone(f)
                })
            })
            .collect();
        Self {
            model: model.to_string(),
            fields,
        }
    }
}

/// Reads a domain of the given data type from its JSON form.
///
/// `null` is the unbounded domain. Categorical domains are lists of values,
/// numerical ones `[low, high]` (with `null` for an open side) or a single
/// number.
pub fn parse_domain(name: &str, dtype: DataType, value: &Value) -> SchemaResult<Domain> {
    match (dtype, value) {
        (_, Value::Null) => Ok(Domain::unbounded(dtype)),
        (DataType::Categorical, Value::Array(items)) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => values.push(s.clone()),
                    Value::Number(n) => values.push(n.to_string()),
                    Value::Bool(b) => values.push(b.to_string()),
                    other => {
                        return Err(SchemaError::invalid_field(
                            name,
                            format!("invalid categorical value {}", other),
                        ))
                    }
                }
            }
            Ok(Domain::discrete(values))
        }
        (DataType::Numerical, Value::Array(items)) if items.len() == 2 => {
            let low = bound(name, &items[0], f64::NEG_INFINITY)?;
            let high = bound(name, &items[1], f64::INFINITY)?;
            if low > high {
                return Err(SchemaError::invalid_field(
                    name,
                    format!("interval [{}, {}] is empty", low, high),
                ));
            }
            Ok(Domain::numeric(low, high))
        }
        (DataType::Categorical, Value::String(s)) => Ok(Domain::discrete([s.as_str()])),
        (DataType::Numerical, Value::Number(_)) => {
            let v = bound(name, value, f64::NAN)?;
            Ok(Domain::numeric(v, v))
        }
        _ => Err(SchemaError::invalid_field(
            name,
            format!("cannot read {} domain from {}", dtype, value),
        )),
    }
}

fn bound(name: &str, value: &Value, unbounded: f64) -> SchemaResult<f64> {
    match value {
        Value::Null => Ok(unbounded),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SchemaError::invalid_field(name, "bound is not a number")),
        other => Err(SchemaError::invalid_field(
            name,
            format!("invalid numeric bound {}", other),
        )),
    }
}
