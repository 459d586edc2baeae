//! Predict compiler
//!
//! Turns one atomic declarative query into a backend predict query.
//! Only the layout is checked: facet queries derived for a discrete axis
//! field keep an `elements` split on that axis, which is a dimension here
//! rather than a template.
//!
//! Column layout (strict order):
//! 1. One column per distinct split field, in declaration order
//! 2. One column per aggregation or density, in declaration order
//!
//! Filters form the WHERE clause and get no column.

use std::collections::HashMap;

use super::compiled::Compiled;
use super::errors::{CompileError, CompileResult};
use crate::pql::{BackendQuery, EntityRef, PredictQuery, Split};
use crate::vismel::Query;

/// Compiles a query with a flat layout into a predict query
pub fn compile_predict(query: &Query) -> CompileResult<Compiled> {
    if !query.has_flat_layout() {
        return Err(CompileError::not_atomic(
            "predict queries need at most one entity per axis",
        ));
    }

    let entities = query.entities();
    let mut fu2idx = HashMap::new();
    let mut idx2fu: Vec<EntityRef> = Vec::new();
    let mut dimensions: Vec<(&Split, usize)> = Vec::new();

    for entity in &entities {
        let Some(split) = entity.as_split() else {
            continue;
        };
        match dimensions.iter().find(|(d, _)| d.field.name == split.field.name) {
            Some((existing, idx)) => {
                if existing.method != split.method {
                    return Err(CompileError::ambiguous_split(
                        split.field.name.clone(),
                        existing.method.as_str(),
                        split.method.as_str(),
                    ));
                }
                fu2idx.insert(entity.id(), *idx);
            }
            None => {
                let idx = idx2fu.len();
                fu2idx.insert(entity.id(), idx);
                idx2fu.push(entity.clone());
                dimensions.push((split, idx));
            }
        }
    }

    for entity in entities.iter().filter(|e| e.is_measure()) {
        fu2idx.insert(entity.id(), idx2fu.len());
        idx2fu.push(entity.clone());
    }

    let backend = BackendQuery::Predict(PredictQuery {
        predict: idx2fu.iter().map(|e| e.predict_ref()).collect(),
        from: query.source.clone(),
        where_: entities
            .iter()
            .filter_map(|e| e.as_filter())
            .map(|f| f.to_json())
            .collect(),
        split_by: dimensions.iter().map(|(s, _)| s.to_json()).collect(),
    });

    Ok(Compiled::new(backend, fu2idx, idx2fu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pql::{
        Aggregation, AggregationMethod, Density, Entity, Filter, SplitMethod,
    };
    use crate::schema::{Field, FieldRef};
    use crate::vismel::{ColorEncoding, ColorMap, Layer, Layout};
    use serde_json::json;
    use std::sync::Arc;

    fn fields() -> (FieldRef, FieldRef) {
        (
            Field::categorical("sex", ["F", "M"], "census").unwrap(),
            Field::numerical("age", 18.0, 90.0, "census").unwrap(),
        )
    }

    #[test]
    fn test_splits_before_measures() {
        let (sex, age) = fields();
        let avg = Entity::new(Aggregation::new(vec![age.clone()], AggregationMethod::Average, "age").unwrap());
        let split = Entity::new(Split::default_for(&sex));
        let filter = Entity::new(Filter::default_for(&age));
        let layer = Layer {
            filters: vec![filter],
            color: Some(ColorMap::new(split.clone(), ColorEncoding::Hue)),
            ..Layer::default()
        };
        let q = Query::new("census", Layout::new(vec![avg.clone()], vec![]), vec![layer]).unwrap();

        let compiled = compile_predict(&q).unwrap();
        assert_eq!(compiled.column_of(&split), Some(0));
        assert_eq!(compiled.column_of(&avg), Some(1));
        assert!(Arc::ptr_eq(compiled.entity_at(1).unwrap(), &avg));

        let v = compiled.query().to_json();
        assert_eq!(v["FROM"], "census");
        assert_eq!(v["PREDICT"][0], json!("sex"));
        assert_eq!(v["PREDICT"][1]["aggregation"], "average");
        assert_eq!(v["WHERE"][0]["operator"], "in");
        assert_eq!(v["SPLIT BY"], json!([{"name": "sex", "split": "elements", "args": []}]));
    }

    #[test]
    fn test_same_split_shares_column() {
        let (sex, age) = fields();
        let a = Entity::new(Split::default_for(&sex));
        let b = Entity::new(Split::default_for(&sex));
        let dens = Entity::new(Density::new(vec![age]).unwrap());
        let layer = Layer {
            color: Some(ColorMap::new(a.clone(), ColorEncoding::Hue)),
            details: vec![b.clone()],
            ..Layer::default()
        };
        let q = Query::new("census", Layout::new(vec![], vec![dens.clone()]), vec![layer]).unwrap();

        let compiled = compile_predict(&q).unwrap();
        assert_eq!(compiled.column_of(&a), Some(0));
        assert_eq!(compiled.column_of(&b), Some(0));
        assert_eq!(compiled.column_of(&dens), Some(1));
        assert_eq!(compiled.column_count(), 2);
    }

    #[test]
    fn test_ambiguous_split() {
        let (_, age) = fields();
        let equi = Entity::new(Split::default_for(&age));
        let ident = Entity::new(Split::new(age.clone(), SplitMethod::Identity, vec![]).unwrap());
        let layer = Layer {
            details: vec![ident],
            ..Layer::default()
        };
        let q = Query::new("census", Layout::new(vec![equi], vec![]), vec![layer]).unwrap();
        let err = compile_predict(&q).unwrap_err();
        assert_eq!(err.code().code(), "VIS_COMPILE_AMBIGUOUS_SPLIT");
        assert_eq!(err.field(), Some("age"));
    }

    #[test]
    fn test_not_atomic() {
        let (sex, age) = fields();
        let rows = vec![
            Entity::new(Split::default_for(&sex)),
            Entity::new(Split::default_for(&age)),
        ];
        let q = Query::new("census", Layout::new(rows, vec![]), vec![Layer::default()]).unwrap();
        let err = compile_predict(&q).unwrap_err();
        assert_eq!(err.code().code(), "VIS_COMPILE_NOT_ATOMIC");
    }
}
