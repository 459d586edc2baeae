//! Table Algebra Tests
//!
//! Tests for axis expressions and their normalized set form:
//! - Row count of `*`-joined discrete operands is the product of domain sizes
//! - `+` concatenates measures
//! - Cells keep references to the original entity objects
//! - Crossing with an empty operand is rejected
//! - Template expansion turns discrete bindings into filters

use std::sync::Arc;

use vislink::algebra::{normalize, AlgebraError, CellItem, Expression, Operator};
use vislink::pql::{
    Aggregation, AggregationMethod, Density, Entity, EntityRef, FilterMethod, Session, Split,
    SplitMethod,
};
use vislink::schema::{Field, FieldRef};
use vislink::vismel::{expand, Layer, Layout, Query};

// =============================================================================
// Helper Functions
// =============================================================================

fn categorical(name: &str, values: &[&str]) -> FieldRef {
    Field::categorical(name, values.iter().copied(), "census").unwrap()
}

fn age() -> FieldRef {
    Field::numerical("age", 18.0, 90.0, "census").unwrap()
}

fn avg_age() -> EntityRef {
    Entity::new(Aggregation::new(vec![age()], AggregationMethod::Average, "age").unwrap())
}

fn split(field: &FieldRef) -> EntityRef {
    Entity::new(Split::default_for(field))
}

// =============================================================================
// Row Count Tests
// =============================================================================

/// Two discrete operands of size 2 and 3 crossed give 6 rows.
#[test]
fn test_cross_of_discrete_domains() {
    let sex = categorical("sex", &["F", "M"]);
    let edu = categorical("education", &["low", "mid", "high"]);
    let expr = Expression::build(&[split(&sex), split(&edu)]).unwrap();

    assert_eq!(expr.operators(), &[Operator::Cross]);
    assert_eq!(expr.row_count(), 6);
    assert_eq!(normalize(&expr).unwrap().len(), 6);
}

/// Row count matches the normal form for mixed expressions.
#[test]
fn test_row_count_matches_normal_form() {
    let sex = categorical("sex", &["F", "M"]);
    let edu = categorical("education", &["low", "mid", "high"]);
    let operands = vec![
        split(&sex),
        split(&edu),
        avg_age(),
        Entity::new(Density::new(vec![age()]).unwrap()),
    ];
    let expr = Expression::build(&operands).unwrap();
    assert_eq!(
        expr.operators(),
        &[Operator::Cross, Operator::Cross, Operator::Concat]
    );
    // (sex * edu * avg) + density
    assert_eq!(expr.row_count(), 7);
    assert_eq!(normalize(&expr).unwrap().len(), 7);
}

/// Measures next to each other concatenate.
#[test]
fn test_measures_concatenate() {
    let a = avg_age();
    let b = Entity::new(Density::new(vec![age()]).unwrap());
    let expr = Expression::build(&[a.clone(), b.clone()]).unwrap();
    let nsf = normalize(&expr).unwrap();
    assert_eq!(nsf.len(), 2);
    assert!(Arc::ptr_eq(nsf[0].symbol().unwrap().unwrap(), &a));
    assert!(Arc::ptr_eq(nsf[1].symbol().unwrap().unwrap(), &b));
}

// =============================================================================
// Identity Tests
// =============================================================================

/// Identity split of sex crossed with avg(age) gives one cell per sex, each
/// holding the same aggregation object.
#[test]
fn test_identity_split_times_aggregation() {
    let sex = categorical("sex", &["F", "M"]);
    let ident = Entity::new(Split::new(sex, SplitMethod::Identity, vec![]).unwrap());
    let avg = avg_age();

    let nsf = normalize(&Expression::build(&[ident.clone(), avg.clone()]).unwrap()).unwrap();
    assert_eq!(nsf.len(), 2);

    let values: Vec<&str> = nsf
        .iter()
        .flat_map(|cell| cell.bindings().map(|(_, v)| v))
        .collect();
    assert_eq!(values, ["F", "M"]);

    for cell in &nsf {
        let (bound, _) = cell.bindings().next().unwrap();
        assert!(Arc::ptr_eq(bound, &ident));
        assert!(Arc::ptr_eq(cell.symbol().unwrap().unwrap(), &avg));
        assert!(matches!(cell.items()[1], CellItem::Symbol(_)));
    }
}

// =============================================================================
// Error Tests
// =============================================================================

/// Crossing with an operand that has no rows is an error.
#[test]
fn test_degenerate_operand_rejected() {
    let empty = Field::categorical("none", Vec::<String>::new(), "census").unwrap();
    let sex = categorical("sex", &["F", "M"]);
    let expr = Expression::build(&[split(&sex), split(&empty)]).unwrap();
    let err = normalize(&expr).unwrap_err();
    assert!(matches!(err, AlgebraError::DegenerateOperand(_)));
}

/// Two continuous operands in one cell cannot be laid out.
#[test]
fn test_two_continuous_in_cell() {
    let age = age();
    let expr = Expression::build(&[split(&age), avg_age()]).unwrap();
    let nsf = normalize(&expr).unwrap();
    assert_eq!(nsf.len(), 1);
    assert!(matches!(
        nsf[0].symbol(),
        Err(AlgebraError::TooManyContinuous { count: 2, .. })
    ));
}

// =============================================================================
// Template Expansion Tests
// =============================================================================

/// A 2 x 3 template expands into a grid of atomic queries with one equals
/// filter per discrete binding.
#[test]
fn test_template_grid() {
    let sex = categorical("sex", &["F", "M"]);
    let edu = categorical("education", &["low", "mid", "high"]);
    let avg = avg_age();
    let q = Query::new(
        "census",
        Layout::new(vec![split(&sex)], vec![split(&edu), avg.clone()]),
        vec![Layer::default()],
    )
    .unwrap();

    let mut session = Session::new();
    let grid = expand(&q, &mut session, 100).unwrap();
    assert_eq!((grid.height(), grid.width()), (2, 3));

    for (_, _, cell) in grid.iter() {
        assert!(cell.is_atomic());
        assert!(Arc::ptr_eq(&cell.layout.cols[0], &avg));
        let filters = &cell.layer().filters;
        assert_eq!(filters.len(), 2);
        for f in filters {
            assert_eq!(f.as_filter().unwrap().method, FilterMethod::Equals);
        }
    }
}

/// The cap bounds the grid size.
#[test]
fn test_template_cap() {
    let sex = categorical("sex", &["F", "M"]);
    let edu = categorical("education", &["low", "mid", "high"]);
    let q = Query::new(
        "census",
        Layout::new(vec![split(&sex)], vec![split(&edu)]),
        vec![Layer::default()],
    )
    .unwrap();
    let err = expand(&q, &mut Session::new(), 5).unwrap_err();
    assert!(err.is_cell_cap());
    assert!(expand(&q, &mut Session::new(), 6).is_ok());
}
