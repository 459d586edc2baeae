//! Backend wire format
//!
//! Compiled queries are sent to the model backend as JSON. Two query shapes
//! are used:
//!
//! - predict: `{"PREDICT": [...], "FROM": model, "WHERE": [...], "SPLIT BY": [...]}`
//! - select: `{"type": "select", "from": model, "select": [...], "where": [...], "opts": {...}}`
//!
//! The backend answers with a row-major table and the ordered column names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query ready to be sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendQuery {
    Predict(PredictQuery),
    Select(SelectQuery),
    Header(HeaderQuery),
}

impl BackendQuery {
    /// Model the query is run against
    pub fn model(&self) -> &str {
        match self {
            BackendQuery::Predict(q) => &q.from,
            BackendQuery::Select(q) => &q.from,
            BackendQuery::Header(q) => &q.from,
        }
    }

    /// Same query against another model
    pub fn with_model(mut self, model: &str) -> Self {
        match &mut self {
            BackendQuery::Predict(q) => q.from = model.to_string(),
            BackendQuery::Select(q) => q.from = model.to_string(),
            BackendQuery::Header(q) => q.from = model.to_string(),
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BackendQuery::Predict(_) => "predict",
            BackendQuery::Select(_) => "select",
            BackendQuery::Header(_) => "header",
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Predict form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictQuery {
    #[serde(rename = "PREDICT")]
    pub predict: Vec<Value>,
    #[serde(rename = "FROM")]
    pub from: String,
    #[serde(rename = "WHERE")]
    pub where_: Vec<Value>,
    #[serde(rename = "SPLIT BY")]
    pub split_by: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectTag {
    Select,
}

/// Which rows a select query draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataCategory {
    #[serde(rename = "training data")]
    Training,
    #[serde(rename = "test data")]
    Test,
    #[serde(rename = "model samples")]
    ModelSamples,
}

impl DataCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataCategory::Training => "training data",
            DataCategory::Test => "test data",
            DataCategory::ModelSamples => "model samples",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    pub data_category: DataCategory,
    pub data_point_limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_samples: Option<usize>,
}

/// Select form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectQuery {
    #[serde(rename = "type")]
    pub tag: SelectTag,
    pub from: String,
    pub select: Vec<String>,
    #[serde(rename = "where")]
    pub where_: Vec<Value>,
    pub opts: SelectOptions,
}

/// Request for a model header, `{"SHOW": "HEADER", "FROM": model}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderQuery {
    #[serde(rename = "SHOW")]
    pub show: String,
    #[serde(rename = "FROM")]
    pub from: String,
}

impl HeaderQuery {
    pub fn new(model: &str) -> Self {
        Self {
            show: "HEADER".to_string(),
            from: model.to_string(),
        }
    }
}

/// Raw backend answer to a predict or select query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTable {
    pub header: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}
