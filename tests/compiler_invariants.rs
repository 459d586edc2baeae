//! Compiler and Facet Derivation Tests
//!
//! Tests for compile and derive invariants:
//! - Conflicting splits on one field are rejected, never silently resolved
//! - Re-deriving a marginal reuses the interned splits
//! - An empty axis is a recoverable skip that leaves the session untouched
//! - Compilers require a flat layout
//! - Select queries carry the sample options
//! - Every derived marginal and joint query compiles

use std::sync::Arc;

use serde_json::json;
use vislink::compiler::{compile_predict, compile_sample};
use vislink::facets::{derive_joint, derive_marginal, DeriveError};
use vislink::pql::{
    Aggregation, AggregationMethod, DataCategory, Entity, EntityRef, SelectOptions, Session,
    Split, SplitMethod,
};
use vislink::schema::{Field, FieldRef};
use vislink::vismel::{Axis, ChannelMap, ColorEncoding, ColorMap, Layer, Layout, Query};

// =============================================================================
// Helper Functions
// =============================================================================

fn sex() -> FieldRef {
    Field::categorical("sex", ["F", "M"], "census").unwrap()
}

fn age() -> FieldRef {
    Field::numerical("age", 18.0, 90.0, "census").unwrap()
}

fn income() -> FieldRef {
    Field::numerical("income", 0.0, 9000.0, "census").unwrap()
}

fn avg(field: FieldRef, yields: &str) -> EntityRef {
    Entity::new(Aggregation::new(vec![field], AggregationMethod::Average, yields).unwrap())
}

/// avg(age) on rows, colored by sex
fn colored_query() -> Query {
    let layer = Layer {
        color: Some(ColorMap::new(
            Entity::new(Split::default_for(&sex())),
            ColorEncoding::Hue,
        )),
        ..Layer::default()
    };
    Query::new(
        "census",
        Layout::new(vec![avg(age(), "age")], vec![]),
        vec![layer],
    )
    .unwrap()
}

// =============================================================================
// Ambiguity Tests
// =============================================================================

/// equi-interval and identity splits on one field conflict.
#[test]
fn test_ambiguous_split_methods() {
    let age = age();
    let equi = Entity::new(Split::new(age.clone(), SplitMethod::EquiInterval, vec![5]).unwrap());
    let ident = Entity::new(Split::new(age, SplitMethod::Identity, vec![]).unwrap());
    let layer = Layer {
        details: vec![ident],
        ..Layer::default()
    };
    let q = Query::new("census", Layout::new(vec![], vec![equi]), vec![layer]).unwrap();

    let err = compile_predict(&q).unwrap_err();
    assert_eq!(err.code().code(), "VIS_COMPILE_AMBIGUOUS_SPLIT");
}

/// Equal splits held by different objects share one column.
#[test]
fn test_equal_splits_do_not_conflict() {
    let sex = sex();
    let a = Entity::new(Split::default_for(&sex));
    let b = Entity::new(Split::default_for(&sex));
    let layer = Layer {
        color: Some(ColorMap::new(a.clone(), ColorEncoding::Hue)),
        details: vec![b.clone()],
        ..Layer::default()
    };
    let q = Query::new("census", Layout::new(vec![avg(age(), "age")], vec![]), vec![layer]).unwrap();
    let compiled = compile_predict(&q).unwrap();
    assert_eq!(compiled.column_of(&a), compiled.column_of(&b));
    assert_eq!(compiled.column_count(), 2);
}

// =============================================================================
// Atomicity Tests
// =============================================================================

/// A templated query must be expanded before compiling.
#[test]
fn test_compile_requires_flat_layout() {
    let q = Query::new(
        "census",
        Layout::new(vec![avg(age(), "age"), avg(income(), "income")], vec![]),
        vec![Layer::default()],
    )
    .unwrap();
    assert_eq!(
        compile_predict(&q).unwrap_err().code().code(),
        "VIS_COMPILE_NOT_ATOMIC"
    );
    let opts = SelectOptions {
        data_category: DataCategory::Training,
        data_point_limit: 10,
        number_of_samples: None,
    };
    assert_eq!(
        compile_sample(&q, opts).unwrap_err().code().code(),
        "VIS_COMPILE_NOT_ATOMIC"
    );
}

/// A discrete split on an axis of a flat query is a dimension, as in the
/// marginal of a categorical measure.
#[test]
fn test_discrete_axis_split_compiles() {
    let split = Entity::new(Split::default_for(&sex()));
    let q = Query::new(
        "census",
        Layout::new(vec![split.clone()], vec![]),
        vec![Layer::default()],
    )
    .unwrap();
    assert!(!q.is_atomic());
    let compiled = compile_predict(&q).unwrap();
    assert_eq!(compiled.column_of(&split), Some(0));

    let mode = Entity::new(Aggregation::new(vec![sex()], AggregationMethod::Maximum, "sex").unwrap());
    let base = Query::new("census", Layout::new(vec![mode], vec![]), vec![Layer::default()]).unwrap();
    let marginal = derive_marginal(&base, Axis::Rows, &mut Session::new(), 50).unwrap();
    assert_eq!(marginal.layout.rows[0].as_split().unwrap().method, SplitMethod::Elements);
    assert_eq!(compile_predict(&marginal).unwrap().column_count(), 2);
}

/// Select queries list the fields in column order and carry their options.
#[test]
fn test_sample_options() {
    let opts = SelectOptions {
        data_category: DataCategory::ModelSamples,
        data_point_limit: 50,
        number_of_samples: Some(20),
    };
    let compiled = compile_sample(&colored_query(), opts).unwrap();
    let v = compiled.query().to_json();
    assert_eq!(v["from"], json!("census"));
    assert_eq!(v["opts"]["data_category"], json!("model samples"));
    assert!(v["select"].as_array().unwrap().contains(&json!("age")));
}

// =============================================================================
// Marginal Derivation Tests
// =============================================================================

/// Deriving the same marginal twice yields identical split objects.
#[test]
fn test_marginal_rederivation_is_idempotent() {
    let q = colored_query();
    compile_predict(&q).unwrap();

    let mut session = Session::new();
    let first = derive_marginal(&q, Axis::Rows, &mut session, 50).unwrap();
    let interned = session.len();
    let second = derive_marginal(&q, Axis::Rows, &mut session, 50).unwrap();

    assert_eq!(session.len(), interned);
    assert!(Arc::ptr_eq(&first.layout.rows[0], &second.layout.rows[0]));
    assert!(Arc::ptr_eq(&first.layout.cols[0], &second.layout.cols[0]));
    let first_color = &first.layer().color.as_ref().unwrap().entity;
    let second_color = &second.layer().color.as_ref().unwrap().entity;
    assert!(Arc::ptr_eq(first_color, second_color));

    let compiled = compile_predict(&first).unwrap();
    assert_eq!(compiled.column_count(), 3);
}

/// The marginal of an empty axis is skipped without touching the session.
#[test]
fn test_marginal_empty_axis_is_skip() {
    let q = colored_query();
    let mut session = Session::new();
    let err = derive_marginal(&q, Axis::Cols, &mut session, 50).unwrap_err();
    assert!(matches!(err, DeriveError::NothingToDo(_)));
    assert!(err.is_skip());
    assert!(session.is_empty());
}

/// Marginal densities over different axes share the color split.
#[test]
fn test_marginals_share_splits_across_axes() {
    let layer = Layer {
        color: Some(ColorMap::new(
            Entity::new(Split::default_for(&sex())),
            ColorEncoding::Hue,
        )),
        ..Layer::default()
    };
    let q = Query::new(
        "census",
        Layout::new(vec![avg(age(), "age")], vec![avg(income(), "income")]),
        vec![layer],
    )
    .unwrap();

    let mut session = Session::new();
    let rows = derive_marginal(&q, Axis::Rows, &mut session, 20).unwrap();
    let cols = derive_marginal(&q, Axis::Cols, &mut session, 20).unwrap();
    let rows_color = &rows.layer().color.as_ref().unwrap().entity;
    let cols_color = &cols.layer().color.as_ref().unwrap().entity;
    assert!(Arc::ptr_eq(rows_color, cols_color));
    assert_eq!(rows.layout.cols[0].yields(), "density(age,sex)");
    assert_eq!(cols.layout.rows[0].yields(), "density(income,sex)");
}

// =============================================================================
// Joint Derivation Tests
// =============================================================================

/// A joint density spans both axis fields.
#[test]
fn test_joint_density() {
    let q = Query::new(
        "census",
        Layout::new(vec![avg(age(), "age")], vec![avg(income(), "income")]),
        vec![Layer::default()],
    )
    .unwrap();
    let mut session = Session::new();
    let joint = derive_joint(&q, &mut session, 35).unwrap();
    let color = joint.layer().color.as_ref().unwrap();
    assert_eq!(color.entity.yields(), "density(income,age)");
    assert_eq!(color.encoding, ColorEncoding::Lightness);

    let compiled = compile_predict(&joint).unwrap();
    assert_eq!(compiled.column_count(), 3);
}

/// A joint density needs both axes.
#[test]
fn test_joint_needs_both_axes() {
    let mut session = Session::new();
    let err = derive_joint(&colored_query(), &mut session, 35).unwrap_err();
    assert!(err.is_skip());
    assert!(session.is_empty());
}

// =============================================================================
// Derive Then Compile Tests
// =============================================================================

/// Derives every marginal and the joint density of `q` and compiles each.
/// Returns the number of derived queries; skips are not counted.
fn compile_all_facets(q: &Query) -> usize {
    compile_predict(q).unwrap();
    let mut session = Session::new();
    let mut derived = Vec::new();
    for axis in [Axis::Rows, Axis::Cols] {
        match derive_marginal(q, axis, &mut session, 50) {
            Ok(m) => derived.push(m),
            Err(e) => assert!(e.is_skip(), "{}", e),
        }
    }
    match derive_joint(q, &mut session, 35) {
        Ok(j) => derived.push(j),
        Err(e) => assert!(e.is_skip(), "{}", e),
    }
    for d in &derived {
        if let Err(e) = compile_predict(d) {
            panic!("derived query does not compile: {}", e);
        }
    }
    derived.len()
}

/// A measure of the axis field on color must not split that field again.
#[test]
fn test_marginal_with_axis_measure_on_color() {
    let layer = Layer {
        color: Some(ColorMap::new(avg(age(), "age"), ColorEncoding::Hue)),
        ..Layer::default()
    };
    let q = Query::new("census", Layout::new(vec![avg(age(), "age")], vec![]), vec![layer]).unwrap();

    let marginal = derive_marginal(&q, Axis::Rows, &mut Session::new(), 50).unwrap();
    assert!(marginal.layer().color.is_none());
    assert_eq!(marginal.layout.cols[0].yields(), "density(age)");
    assert_eq!(compile_predict(&marginal).unwrap().column_count(), 2);
    assert_eq!(compile_all_facets(&q), 1);
}

/// A numerical detail split on the axis field is dropped from the marginal.
#[test]
fn test_marginal_with_numerical_detail_on_axis_field() {
    let age = age();
    let equi = Entity::new(Split::new(age.clone(), SplitMethod::EquiInterval, vec![5]).unwrap());
    let layer = Layer {
        details: vec![equi],
        color: Some(ColorMap::new(
            Entity::new(Split::default_for(&sex())),
            ColorEncoding::Hue,
        )),
        ..Layer::default()
    };
    let q = Query::new("census", Layout::new(vec![avg(age, "age")], vec![]), vec![layer]).unwrap();

    let marginal = derive_marginal(&q, Axis::Rows, &mut Session::new(), 50).unwrap();
    assert!(marginal.layer().details.is_empty());
    assert_eq!(marginal.layout.cols[0].yields(), "density(age,sex)");
    let split = marginal.layout.rows[0].as_split().unwrap();
    assert_eq!(split.method, SplitMethod::Density);
    assert_eq!(compile_predict(&marginal).unwrap().column_count(), 3);
}

/// Numerical splits of other fields do not split the density either.
#[test]
fn test_marginal_drops_continuous_channel_splits() {
    let income_split = Entity::new(Split::default_for(&income()));
    let layer = Layer {
        shape: Some(ChannelMap::new(income_split.clone())),
        size: Some(ChannelMap::new(avg(income(), "income"))),
        details: vec![income_split],
        ..Layer::default()
    };
    let q = Query::new("census", Layout::new(vec![], vec![avg(age(), "age")]), vec![layer]).unwrap();

    let marginal = derive_marginal(&q, Axis::Cols, &mut Session::new(), 50).unwrap();
    assert!(marginal.layer().details.is_empty());
    assert_eq!(marginal.layout.rows[0].yields(), "density(age)");
    assert_eq!(compile_all_facets(&q), 1);
}

/// Shape and size move into the details; discrete ones survive.
#[test]
fn test_marginal_with_shape_and_size() {
    let sex_split = Entity::new(Split::default_for(&sex()));
    let layer = Layer {
        shape: Some(ChannelMap::new(sex_split.clone())),
        size: Some(ChannelMap::new(avg(age(), "age"))),
        ..Layer::default()
    };
    let q = Query::new(
        "census",
        Layout::new(vec![avg(age(), "age")], vec![avg(income(), "income")]),
        vec![layer],
    )
    .unwrap();

    let mut session = Session::new();
    let marginal = derive_marginal(&q, Axis::Cols, &mut session, 50).unwrap();
    assert!(marginal.layer().shape.is_none() && marginal.layer().size.is_none());
    assert_eq!(marginal.layer().details.len(), 1);
    assert!(Arc::ptr_eq(&marginal.layer().details[0], &sex_split));
    assert_eq!(marginal.layout.rows[0].yields(), "density(income,sex)");
    assert_eq!(compile_predict(&marginal).unwrap().column_count(), 3);
    assert_eq!(compile_all_facets(&q), 3);
}

/// Two measures with channels on both axis fields: every facet compiles.
#[test]
fn test_all_facets_compile_with_axis_fields_on_channels() {
    let layer = Layer {
        color: Some(ColorMap::new(avg(income(), "income"), ColorEncoding::Hue)),
        details: vec![
            Entity::new(Split::new(age(), SplitMethod::EquiInterval, vec![4]).unwrap()),
            Entity::new(Split::default_for(&sex())),
        ],
        ..Layer::default()
    };
    let q = Query::new(
        "census",
        Layout::new(vec![avg(age(), "age")], vec![avg(income(), "income")]),
        vec![layer],
    )
    .unwrap();
    assert_eq!(compile_all_facets(&q), 3);
}
