//! In-process backend with deterministic answers
//!
//! Answers are synthesized from the model header alone:
//! - split values cover the field extent, narrowed by WHERE filters
//! - aggregations walk the extent of their yield field row by row
//! - densities decay with the row index
//! - select queries cycle through the field values
//!
//! Empirical models (`emp_<model>`) reuse the header of their model.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

use super::backend::{BackendFuture, ModelBackend};
use super::errors::{BackendError, BackendResult};
use crate::facets::EMPIRICAL_PREFIX;
use crate::pql::{BackendQuery, PredictQuery, ResponseTable, SelectQuery};
use crate::schema::{Domain, Field, FieldRef, ModelHeader};

/// Rows of a select query without an explicit sample count
const DEFAULT_SELECT_ROWS: usize = 10;
/// Points of an identity split over a numerical field
const IDENTITY_POINTS: u32 = 5;

/// Deterministic backend for tests and the command line
#[derive(Debug, Default)]
pub struct DummyBackend {
    headers: HashMap<String, ModelHeader>,
    failure: Option<String>,
    latency: Option<Duration>,
    executed: AtomicU64,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, header: ModelHeader) -> Self {
        self.headers.insert(header.model().to_string(), header);
        self
    }

    /// Every query fails with a transport error
    pub fn failing(mut self, reason: impl Into<String>) -> Self {
        self.failure = Some(reason.into());
        self
    }

    /// Delays every answer
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of queries executed so far
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }

    fn lookup(&self, model: &str) -> BackendResult<&ModelHeader> {
        self.headers
            .get(model)
            .or_else(|| {
                model
                    .strip_prefix(EMPIRICAL_PREFIX)
                    .and_then(|base| self.headers.get(base))
            })
            .ok_or_else(|| BackendError::UnknownModel(model.to_string()))
    }

    fn answer(&self, query: &BackendQuery) -> BackendResult<ResponseTable> {
        if let Some(reason) = &self.failure {
            return Err(BackendError::Transport(reason.clone()));
        }
        let header = self.lookup(query.model())?;
        match query {
            BackendQuery::Predict(q) => predict(header, q),
            BackendQuery::Select(q) => select(header, q),
            BackendQuery::Header(_) => Err(BackendError::Malformed(
                "header requests are not table queries".to_string(),
            )),
        }
    }
}

impl ModelBackend for DummyBackend {
    fn header<'a>(&'a self, model: &'a str) -> BackendFuture<'a, ModelHeader> {
        Box::pin(async move {
            let header = self.lookup(model)?;
            if header.model() == model {
                Ok(header.clone())
            } else {
                Ok(header.renamed(model))
            }
        })
    }

    fn execute<'a>(&'a self, query: &'a BackendQuery) -> BackendFuture<'a, ResponseTable> {
        Box::pin(async move {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.executed.fetch_add(1, Ordering::Relaxed);
            self.answer(query)
        })
    }
}

/// Values a field may take under the WHERE clause
enum Allowed {
    Values(Vec<String>),
    Range(f64, f64),
}

fn allowed(field: &Field, where_: &[Value]) -> BackendResult<Allowed> {
    let mut out = match &field.extent {
        Domain::Numeric { low, high } => Allowed::Range(*low, *high),
        other => Allowed::Values(other.values().map(|v| v.to_vec()).unwrap_or_default()),
    };
    for filter in where_ {
        if filter["name"].as_str() != Some(field.name.as_str()) {
            continue;
        }
        let value = &filter["value"];
        out = match out {
            Allowed::Values(values) => {
                let keep: Vec<String> = match value {
                    Value::Array(items) => items.iter().map(text).collect(),
                    v => vec![text(v)],
                };
                Allowed::Values(values.into_iter().filter(|v| keep.contains(v)).collect())
            }
            Allowed::Range(lo, hi) => {
                let (a, b) = match value {
                    Value::Array(items) if items.len() == 2 => (number(&items[0])?, number(&items[1])?),
                    v => {
                        let x = number(v)?;
                        (x, x)
                    }
                };
                Allowed::Range(lo.max(a.min(b)), hi.min(a.max(b)))
            }
        };
    }
    Ok(out)
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number(v: &Value) -> BackendResult<f64> {
    v.as_f64()
        .ok_or_else(|| BackendError::Malformed(format!("expected a number, got {}", v)))
}

fn field<'h>(header: &'h ModelHeader, v: &Value) -> BackendResult<&'h FieldRef> {
    let name = v
        .as_str()
        .ok_or_else(|| BackendError::Malformed(format!("expected a field name, got {}", v)))?;
    header
        .field(name)
        .ok_or_else(|| BackendError::Malformed(format!("unknown field '{}'", name)))
}

fn split_values(header: &ModelHeader, split: &Value, where_: &[Value]) -> BackendResult<Vec<Value>> {
    let f = field(header, &split["name"])?;
    let method = split["split"].as_str().unwrap_or("identity");
    let n = split["args"]
        .get(0)
        .and_then(Value::as_u64)
        .map(|n| n as u32)
        .unwrap_or(IDENTITY_POINTS)
        .max(1);
    Ok(match allowed(f, where_)? {
        Allowed::Values(values) => values.into_iter().map(Value::String).collect(),
        Allowed::Range(lo, hi) if lo > hi => Vec::new(),
        Allowed::Range(lo, hi) if lo == hi => vec![json!(lo)],
        Allowed::Range(lo, hi) => {
            let step = (hi - lo) / n as f64;
            (0..n)
                .map(|i| match method {
                    "equiinterval" | "equidist" => json!(lo + step * (i as f64 + 0.5)),
                    _ if n == 1 => json!((lo + hi) / 2.0),
                    _ => json!(lo + (hi - lo) * i as f64 / (n - 1) as f64),
                })
                .collect()
        }
    })
}

fn predict(header: &ModelHeader, q: &PredictQuery) -> BackendResult<ResponseTable> {
    let mut names: Vec<String> = Vec::with_capacity(q.split_by.len());
    let mut rows: Vec<Vec<Value>> = vec![Vec::new()];
    for split in &q.split_by {
        let values = split_values(header, split, &q.where_)?;
        names.push(text(&split["name"]));
        rows = rows
            .iter()
            .flat_map(|row| {
                values.iter().map(move |v| {
                    let mut next = row.clone();
                    next.push(v.clone());
                    next
                })
            })
            .collect();
    }

    let total = rows.len();
    let mut header_out = Vec::with_capacity(q.predict.len());
    let mut columns: Vec<Vec<Value>> = Vec::with_capacity(q.predict.len());
    for item in &q.predict {
        match item {
            Value::String(name) => {
                let idx = names.iter().position(|n| n == name).ok_or_else(|| {
                    BackendError::Malformed(format!("'{}' is predicted but not split", name))
                })?;
                header_out.push(name.clone());
                columns.push(rows.iter().map(|r| r[idx].clone()).collect());
            }
            Value::Object(_) => {
                let method = item["aggregation"].as_str().unwrap_or_default();
                if method == "density" || method == "probability" {
                    let fields: Vec<String> = item["name"]
                        .as_array()
                        .map(|a| a.iter().map(text).collect())
                        .unwrap_or_default();
                    header_out.push(format!("density({})", fields.join(",")));
                    columns.push((0..total).map(|i| json!(1.0 / (i as f64 + 2.0))).collect());
                } else {
                    let yields = field(header, &item["yields"])?;
                    header_out.push(yields.name.clone());
                    let column = match allowed(yields, &q.where_)? {
                        Allowed::Values(values) => {
                            let first = values.first().cloned().map(Value::String).unwrap_or(Value::Null);
                            vec![first; total]
                        }
                        Allowed::Range(lo, hi) => (0..total)
                            .map(|i| json!(lo + (hi - lo) * (i as f64 + 1.0) / (total as f64 + 1.0)))
                            .collect(),
                    };
                    columns.push(column);
                }
            }
            other => {
                return Err(BackendError::Malformed(format!("bad PREDICT entry {}", other)));
            }
        }
    }

    Ok(ResponseTable {
        header: header_out,
        data: (0..total)
            .map(|i| columns.iter().map(|c| c[i].clone()).collect())
            .collect(),
    })
}

fn select(header: &ModelHeader, q: &SelectQuery) -> BackendResult<ResponseTable> {
    let count = q
        .opts
        .number_of_samples
        .unwrap_or(DEFAULT_SELECT_ROWS)
        .min(q.opts.data_point_limit);
    let mut columns = Vec::with_capacity(q.select.len());
    for name in &q.select {
        let f = field(header, &Value::String(name.clone()))?;
        let column: Vec<Value> = match allowed(f, &q.where_)? {
            Allowed::Values(values) if values.is_empty() => vec![Value::Null; count],
            Allowed::Values(values) => (0..count)
                .map(|i| Value::String(values[i % values.len()].clone()))
                .collect(),
            Allowed::Range(lo, hi) => (0..count)
                .map(|i| json!(lo + (hi - lo) * ((i * 7) % (count.max(1))) as f64 / count.max(1) as f64))
                .collect(),
        };
        columns.push(column);
    }
    Ok(ResponseTable {
        header: q.select.clone(),
        data: (0..count)
            .map(|i| columns.iter().map(|c| c[i].clone()).collect())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::{DataCategory, SelectOptions, SelectTag};

    fn header() -> ModelHeader {
        ModelHeader::from_json(
            "census",
            &json!({"fields": [
                {"name": "sex", "dtype": "string", "domain": ["F", "M"], "extent": ["F", "M"]},
                {"name": "age", "dtype": "numerical", "domain": [0, 120], "extent": [20, 60]}
            ]}),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_predict_grid() {
        let backend = DummyBackend::new().with_model(header());
        let q = BackendQuery::Predict(PredictQuery {
            predict: vec![
                json!("sex"),
                json!({"name": ["age"], "aggregation": "average", "yields": "age", "args": []}),
            ],
            from: "census".into(),
            where_: vec![json!({"name": "sex", "operator": "equals", "value": "F"})],
            split_by: vec![json!({"name": "sex", "split": "elements", "args": []})],
        });
        let t = backend.execute(&q).await.unwrap();
        assert_eq!(t.header, vec!["sex", "age"]);
        assert_eq!(t.data, vec![vec![json!("F"), json!(40.0)]]);
        assert_eq!(backend.executed(), 1);
    }

    #[tokio::test]
    async fn test_density_split_covers_extent() {
        let backend = DummyBackend::new().with_model(header());
        let q = BackendQuery::Predict(PredictQuery {
            predict: vec![json!("age"), json!({"name": ["age"], "aggregation": "density", "args": []})],
            from: "emp_census".into(),
            where_: vec![],
            split_by: vec![json!({"name": "age", "split": "density", "args": [5]})],
        });
        let t = backend.execute(&q).await.unwrap();
        assert_eq!(t.header[1], "density(age)");
        assert_eq!(t.data.len(), 5);
        assert_eq!(t.data[0][0], json!(20.0));
        assert_eq!(t.data[4][0], json!(60.0));
    }

    #[tokio::test]
    async fn test_select_and_failures() {
        let backend = DummyBackend::new().with_model(header());
        let q = BackendQuery::Select(SelectQuery {
            tag: SelectTag::Select,
            from: "census".into(),
            select: vec!["sex".into(), "age".into()],
            where_: vec![],
            opts: SelectOptions {
                data_category: DataCategory::Training,
                data_point_limit: 4,
                number_of_samples: None,
            },
        });
        let t = backend.execute(&q).await.unwrap();
        assert_eq!(t.data.len(), 4);
        assert_eq!(t.data[1][0], json!("M"));

        let other = q.clone().with_model("other");
        let err = backend.execute(&other).await.unwrap_err();
        assert_eq!(err.code(), "VIS_BACKEND_UNKNOWN_MODEL");

        let down = DummyBackend::new().with_model(header()).failing("connection refused");
        assert_eq!(down.execute(&q).await.unwrap_err().code(), "VIS_BACKEND_TRANSPORT");
    }

    #[tokio::test]
    async fn test_empirical_header() {
        let backend = DummyBackend::new().with_model(header());
        let h = backend.header("emp_census").await.unwrap();
        assert_eq!(h.model(), "emp_census");
        assert_eq!(h.fields().len(), 2);
    }
}
