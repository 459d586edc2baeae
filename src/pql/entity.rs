//! Query entities
//!
//! Splits, aggregations, densities and filters are the vocabulary of both
//! the declarative query and the compiled backend query. Each entity wraps
//! one or more shared [`FieldRef`]s and is itself shared as an [`EntityRef`].
//!
//! Entities compare by identity ([`EntityId`]), never by value. The only
//! state that changes after construction is the display extent, which is
//! published exactly once per evaluation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::errors::{EntityError, EntityResult};
use super::extent::Extent;
use crate::schema::{DataType, Domain, Field, FieldRef};

/// Name of the sentinel field that selects model or data display
pub const MODEL_VS_DATA: &str = "model vs data";

/// Bucket count of default equi-interval splits
pub const DEFAULT_SPLIT_BUCKETS: u32 = 4;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an entity instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(u64);

impl EntityId {
    fn next() -> Self {
        EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a split partitions its field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Equally wide intervals, `args = [count]`
    EquiInterval,
    /// Every value of the field
    Identity,
    /// Every element of a categorical domain
    Elements,
    /// High resolution sampling for density plots, `args = [resolution]`
    Density,
}

impl SplitMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMethod::EquiInterval => "equiinterval",
            SplitMethod::Identity => "identity",
            SplitMethod::Elements => "elements",
            SplitMethod::Density => "density",
        }
    }

    pub fn parse(s: &str) -> EntityResult<Self> {
        match s {
            "equiinterval" | "equidist" => Ok(SplitMethod::EquiInterval),
            "identity" => Ok(SplitMethod::Identity),
            "elements" => Ok(SplitMethod::Elements),
            "density" => Ok(SplitMethod::Density),
            other => Err(EntityError::UnknownMethod {
                kind: "split",
                method: other.to_string(),
            }),
        }
    }
}

/// How an aggregation reduces its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMethod {
    /// Point of maximum probability
    Maximum,
    /// Expected value
    Average,
}

impl AggregationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMethod::Maximum => "maximum",
            AggregationMethod::Average => "average",
        }
    }

    pub fn parse(s: &str) -> EntityResult<Self> {
        match s {
            "maximum" => Ok(AggregationMethod::Maximum),
            "average" => Ok(AggregationMethod::Average),
            other => Err(EntityError::UnknownMethod {
                kind: "aggregation",
                method: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityMethod {
    Density,
    Probability,
}

impl DensityMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DensityMethod::Density => "density",
            DensityMethod::Probability => "probability",
        }
    }

    pub fn parse(s: &str) -> EntityResult<Self> {
        match s {
            "density" => Ok(DensityMethod::Density),
            "probability" => Ok(DensityMethod::Probability),
            other => Err(EntityError::UnknownMethod {
                kind: "density",
                method: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMethod {
    /// Field equals a single value
    Equals,
    /// Field lies in a set or interval
    In,
}

impl FilterMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMethod::Equals => "equals",
            FilterMethod::In => "in",
        }
    }

    pub fn parse(s: &str) -> EntityResult<Self> {
        match s {
            "equals" => Ok(FilterMethod::Equals),
            "in" => Ok(FilterMethod::In),
            other => Err(EntityError::UnknownMethod {
                kind: "filter",
                method: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Split
// ============================================================================

/// Partitions a field into groups
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub field: FieldRef,
    pub method: SplitMethod,
    pub args: Vec<u32>,
}

impl Split {
    /// Creates a split after checking that `method` fits the field
    pub fn new(field: FieldRef, method: SplitMethod, args: Vec<u32>) -> EntityResult<Self> {
        let invalid = |reason: &str| EntityError::InvalidMethod {
            kind: "split",
            field: field.name.clone(),
            reason: reason.to_string(),
        };
        match method {
            SplitMethod::EquiInterval | SplitMethod::Density => {
                if field.is_discrete() {
                    return Err(invalid("requires a numerical field"));
                }
                if args.len() != 1 || args[0] == 0 {
                    return Err(EntityError::InvalidArgs {
                        kind: "split",
                        field: field.name.clone(),
                        reason: format!("expected one positive count, got {:?}", args),
                    });
                }
            }
            SplitMethod::Elements => {
                if !field.is_discrete() {
                    return Err(invalid("requires a categorical field"));
                }
            }
            SplitMethod::Identity => {}
        }
        Ok(Self {
            field,
            method,
            args,
        })
    }

    /// Default split of a field: all elements of a categorical field, or
    /// [`DEFAULT_SPLIT_BUCKETS`] equal intervals of a numerical one.
    pub fn default_for(field: &FieldRef) -> Self {
        let (method, args) = match field.data_type {
            DataType::Categorical => (SplitMethod::Elements, Vec::new()),
            DataType::Numerical => (SplitMethod::EquiInterval, vec![DEFAULT_SPLIT_BUCKETS]),
        };
        Self {
            field: Arc::clone(field),
            method,
            args,
        }
    }

    /// High resolution split used by density facets
    pub fn for_density(field: &FieldRef, resolution: u32) -> EntityResult<Self> {
        match field.data_type {
            DataType::Categorical => Split::new(Arc::clone(field), SplitMethod::Elements, vec![]),
            DataType::Numerical => {
                Split::new(Arc::clone(field), SplitMethod::Density, vec![resolution])
            }
        }
    }

    /// Default split over the primary field of an entity
    pub fn from_kind(kind: &EntityKind) -> Self {
        Split::default_for(kind.primary_field())
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Backend form `{name, split, args}`
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.field.name,
            "split": self.method.as_str(),
            "args": self.args,
        })
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Reduces the joint distribution of its fields to one value of `yields`
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub fields: Vec<FieldRef>,
    pub method: AggregationMethod,
    pub yields: String,
}

impl Aggregation {
    pub fn new(
        fields: Vec<FieldRef>,
        method: AggregationMethod,
        yields: impl Into<String>,
    ) -> EntityResult<Self> {
        let yields = yields.into();
        if fields.is_empty() {
            return Err(EntityError::NoFields("Aggregation"));
        }
        if !fields.iter().any(|f| f.name == yields) {
            return Err(EntityError::YieldNotInFields {
                yields,
                fields: names(&fields).join(","),
            });
        }
        Ok(Self {
            fields,
            method,
            yields,
        })
    }

    /// Maximum aggregation yielding the first field
    pub fn default_for(fields: Vec<FieldRef>) -> EntityResult<Self> {
        let yields = fields
            .first()
            .map(|f| f.name.clone())
            .ok_or(EntityError::NoFields("Aggregation"))?;
        Aggregation::new(fields, AggregationMethod::Maximum, yields)
    }

    /// The field whose value is produced
    pub fn yield_field(&self) -> &FieldRef {
        // yields was checked against the fields on construction
        self.fields
            .iter()
            .find(|f| f.name == self.yields)
            .unwrap_or(&self.fields[0])
    }

    pub fn names(&self) -> Vec<&str> {
        names(&self.fields)
    }

    /// Backend form `{name: [...], aggregation, yields, args}`
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.names(),
            "aggregation": self.method.as_str(),
            "yields": self.yields,
            "args": [],
        })
    }
}

// ============================================================================
// Density
// ============================================================================

/// Probability density over the joint values of its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Density {
    pub fields: Vec<FieldRef>,
    pub method: DensityMethod,
}

impl Density {
    /// Creates a density. Repeated fields are kept once, in first-seen order.
    pub fn new(fields: Vec<FieldRef>) -> EntityResult<Self> {
        Density::with_method(fields, DensityMethod::Density)
    }

    pub fn with_method(fields: Vec<FieldRef>, method: DensityMethod) -> EntityResult<Self> {
        let mut unique: Vec<FieldRef> = Vec::with_capacity(fields.len());
        for f in fields {
            if !unique.iter().any(|u| u.name == f.name) {
                unique.push(f);
            }
        }
        if unique.is_empty() {
            return Err(EntityError::NoFields("Density"));
        }
        Ok(Self {
            fields: unique,
            method,
        })
    }

    pub fn names(&self) -> Vec<&str> {
        names(&self.fields)
    }

    /// Name of the produced value, e.g. `density(age,sex)`
    pub fn yields(&self) -> String {
        format!("density({})", self.names().join(","))
    }

    pub fn to_json(&self) -> Value {
        json!({
            "name": self.names(),
            "aggregation": self.method.as_str(),
            "args": [],
        })
    }
}

// ============================================================================
// Filter
// ============================================================================

/// Restricts a field to a value or set of values
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: FieldRef,
    pub method: FilterMethod,
    pub args: Domain,
}

impl Filter {
    pub fn new(field: FieldRef, method: FilterMethod, args: Domain) -> EntityResult<Self> {
        if args.data_type() != field.data_type {
            return Err(EntityError::InvalidArgs {
                kind: "filter",
                field: field.name.clone(),
                reason: format!("{} does not fit a {} field", args, field.data_type),
            });
        }
        if method == FilterMethod::Equals && !args.is_singular() {
            return Err(EntityError::InvalidArgs {
                kind: "filter",
                field: field.name.clone(),
                reason: format!("'equals' needs a single value, got {}", args),
            });
        }
        Ok(Self {
            field,
            method,
            args,
        })
    }

    /// Filter on the field's whole extent
    pub fn default_for(field: &FieldRef) -> Self {
        Self {
            field: Arc::clone(field),
            method: FilterMethod::In,
            args: field.extent.clone(),
        }
    }

    /// Filter on a single value, given in its textual form
    pub fn equals(field: &FieldRef, value: &str) -> EntityResult<Self> {
        let args = match field.data_type {
            DataType::Categorical => Domain::discrete([value]),
            DataType::Numerical => {
                let v: f64 = value.parse().map_err(|_| EntityError::InvalidArgs {
                    kind: "filter",
                    field: field.name.clone(),
                    reason: format!("'{}' is not a number", value),
                })?;
                Domain::numeric(v, v)
            }
        };
        Filter::new(Arc::clone(field), FilterMethod::Equals, args)
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    /// Backend form `{name, operator, value}`
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.field.name,
            "operator": self.method.as_str(),
            "value": self.args.to_json_value(),
        })
    }
}

fn names(fields: &[FieldRef]) -> Vec<&str> {
    fields.iter().map(|f| f.name.as_str()).collect()
}

// ============================================================================
// Entity
// ============================================================================

/// The closed set of entity kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Split(Split),
    Aggregation(Aggregation),
    Density(Density),
    Filter(Filter),
}

impl EntityKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntityKind::Split(_) => "split",
            EntityKind::Aggregation(_) => "aggregation",
            EntityKind::Density(_) => "density",
            EntityKind::Filter(_) => "filter",
        }
    }

    /// The field an entity is mainly about: the split or filtered field,
    /// the yielded field of an aggregation, the first field of a density.
    pub fn primary_field(&self) -> &FieldRef {
        match self {
            EntityKind::Split(s) => &s.field,
            EntityKind::Filter(f) => &f.field,
            EntityKind::Aggregation(a) => a.yield_field(),
            EntityKind::Density(d) => &d.fields[0],
        }
    }

    /// Canonical identity used by the session registry
    pub fn identity_key(&self) -> String {
        match self {
            EntityKind::Split(s) => format!(
                "split:{}.{}:{}:{:?}",
                s.field.source,
                s.field.name,
                s.method.as_str(),
                s.args
            ),
            EntityKind::Aggregation(a) => format!(
                "aggregation:{}.[{}]:{}:{}",
                a.fields[0].source,
                a.names().join(","),
                a.method.as_str(),
                a.yields
            ),
            EntityKind::Density(d) => format!(
                "density:{}.[{}]:{}",
                d.fields[0].source,
                d.names().join(","),
                d.method.as_str()
            ),
            EntityKind::Filter(f) => format!(
                "filter:{}.{}:{}:{}",
                f.field.source,
                f.field.name,
                f.method.as_str(),
                f.args
            ),
        }
    }
}

impl From<Split> for EntityKind {
    fn from(s: Split) -> Self {
        EntityKind::Split(s)
    }
}

impl From<Aggregation> for EntityKind {
    fn from(a: Aggregation) -> Self {
        EntityKind::Aggregation(a)
    }
}

impl From<Density> for EntityKind {
    fn from(d: Density) -> Self {
        EntityKind::Density(d)
    }
}

impl From<Filter> for EntityKind {
    fn from(f: Filter) -> Self {
        EntityKind::Filter(f)
    }
}

/// A query entity instance
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    extent: OnceLock<Extent>,
}

/// Shared handle to an entity
pub type EntityRef = Arc<Entity>;

impl Entity {
    /// Wraps a validated kind into a new, uniquely identified entity
    pub fn new(kind: impl Into<EntityKind>) -> EntityRef {
        Arc::new(Self {
            id: EntityId::next(),
            kind: kind.into(),
            extent: OnceLock::new(),
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn as_split(&self) -> Option<&Split> {
        match &self.kind {
            EntityKind::Split(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_aggregation(&self) -> Option<&Aggregation> {
        match &self.kind {
            EntityKind::Aggregation(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_density(&self) -> Option<&Density> {
        match &self.kind {
            EntityKind::Density(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_filter(&self) -> Option<&Filter> {
        match &self.kind {
            EntityKind::Filter(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self.kind, EntityKind::Split(_))
    }

    pub fn is_filter(&self) -> bool {
        matches!(self.kind, EntityKind::Filter(_))
    }

    /// True for aggregations and densities
    pub fn is_measure(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Aggregation(_) | EntityKind::Density(_)
        )
    }

    /// Name of the semantic dimension this entity produces
    pub fn yields(&self) -> String {
        match &self.kind {
            EntityKind::Split(s) => s.field.name.clone(),
            EntityKind::Aggregation(a) => a.yields.clone(),
            EntityKind::Density(d) => d.yields(),
            EntityKind::Filter(f) => f.field.name.clone(),
        }
    }

    /// Data type of the produced values
    pub fn yield_data_type(&self) -> DataType {
        match &self.kind {
            EntityKind::Split(s) => s.field.data_type,
            EntityKind::Aggregation(a) => a.yield_field().data_type,
            EntityKind::Density(_) => DataType::Numerical,
            EntityKind::Filter(f) => f.field.data_type,
        }
    }

    pub fn has_discrete_yield(&self) -> bool {
        self.yield_data_type().is_discrete()
    }

    /// All fields referenced by this entity
    pub fn fields(&self) -> Vec<&FieldRef> {
        match &self.kind {
            EntityKind::Split(s) => vec![&s.field],
            EntityKind::Filter(f) => vec![&f.field],
            EntityKind::Aggregation(a) => a.fields.iter().collect(),
            EntityKind::Density(d) => d.fields.iter().collect(),
        }
    }

    pub fn identity_key(&self) -> String {
        self.kind.identity_key()
    }

    /// Returns true if both handles denote the same instance
    pub fn same_as(&self, other: &Entity) -> bool {
        self.id == other.id
    }

    /// Structurally equal instance with a new identity and its own fields
    pub fn copy(&self) -> EntityRef {
        fn own(f: &FieldRef) -> FieldRef {
            Arc::new(Field::clone(f))
        }
        let kind = match &self.kind {
            EntityKind::Split(s) => EntityKind::Split(Split {
                field: own(&s.field),
                ..s.clone()
            }),
            EntityKind::Filter(f) => EntityKind::Filter(Filter {
                field: own(&f.field),
                ..f.clone()
            }),
            EntityKind::Aggregation(a) => EntityKind::Aggregation(Aggregation {
                fields: a.fields.iter().map(own).collect(),
                ..a.clone()
            }),
            EntityKind::Density(d) => EntityKind::Density(Density {
                fields: d.fields.iter().map(own).collect(),
                ..d.clone()
            }),
        };
        Entity::new(kind)
    }

    /// Entry of the PREDICT clause: the bare field name for splits,
    /// the full object for measures.
    pub fn predict_ref(&self) -> Value {
        match &self.kind {
            EntityKind::Split(s) => Value::String(s.field.name.clone()),
            EntityKind::Filter(f) => Value::String(f.field.name.clone()),
            EntityKind::Aggregation(a) => a.to_json(),
            EntityKind::Density(d) => d.to_json(),
        }
    }

    /// Display extent, once published
    pub fn extent(&self) -> Option<&Extent> {
        self.extent.get()
    }

    /// Publishes the display extent. Fails with the rejected value if an
    /// extent was published before.
    pub fn set_extent(&self, extent: Extent) -> Result<(), Extent> {
        self.extent.set(extent)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Split(s) => {
                write!(f, "{} of {} {:?}", s.method.as_str(), s.field.name, s.args)
            }
            EntityKind::Aggregation(a) => write!(
                f,
                "{} of [{}] yields {}",
                a.method.as_str(),
                a.names().join(","),
                a.yields
            ),
            EntityKind::Density(d) => {
                write!(f, "{} of [{}]", d.method.as_str(), d.names().join(","))
            }
            EntityKind::Filter(flt) => write!(
                f,
                "{} {} {}",
                flt.field.name,
                flt.method.as_str(),
                flt.args
            ),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sex() -> FieldRef {
        Field::categorical("sex", ["F", "M"], "census").unwrap()
    }

    fn age() -> FieldRef {
        Field::numerical("age", 18.0, 90.0, "census").unwrap()
    }

    #[test]
    fn test_default_split() {
        let s = Split::default_for(&sex());
        assert_eq!(s.method, SplitMethod::Elements);
        let a = Split::default_for(&age());
        assert_eq!(a.method, SplitMethod::EquiInterval);
        assert_eq!(a.args, vec![4]);
    }

    #[test]
    fn test_split_method_checked() {
        let err = Split::new(sex(), SplitMethod::EquiInterval, vec![4]).unwrap_err();
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_METHOD");

        let err = Split::new(age(), SplitMethod::Density, vec![0]).unwrap_err();
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_ARGS");

        assert!(Split::new(age(), SplitMethod::Identity, vec![]).is_ok());
    }

    #[test]
    fn test_aggregation_yield_must_be_a_field() {
        let err = Aggregation::new(vec![age()], AggregationMethod::Average, "sex").unwrap_err();
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_YIELD");

        let agg = Aggregation::default_for(vec![age(), sex()]).unwrap();
        assert_eq!(agg.yields, "age");
        assert_eq!(agg.method, AggregationMethod::Maximum);
        assert!(Aggregation::default_for(vec![]).is_err());
    }

    #[test]
    fn test_density_yields_and_dedup() {
        let d = Density::new(vec![age(), sex(), age()]).unwrap();
        assert_eq!(d.yields(), "density(age,sex)");
        let e = Entity::new(d);
        assert_eq!(e.yield_data_type(), DataType::Numerical);
        assert!(e.is_measure());
        assert!(Density::new(vec![]).is_err());
    }

    #[test]
    fn test_filter_args_checked() {
        let err = Filter::new(age(), FilterMethod::In, Domain::discrete(["x"])).unwrap_err();
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_ARGS");

        let err = Filter::new(sex(), FilterMethod::Equals, Domain::discrete(["F", "M"]))
            .unwrap_err();
        assert_eq!(err.code(), "VIS_ENTITY_INVALID_ARGS");

        let f = Filter::equals(&sex(), "F").unwrap();
        assert_eq!(
            f.to_json(),
            json!({"name": "sex", "operator": "equals", "value": "F"})
        );
        assert!(Filter::equals(&age(), "old").is_err());
    }

    #[test]
    fn test_copy_is_distinct() {
        let e = Entity::new(Split::default_for(&age()));
        let c = e.copy();
        assert!(!e.same_as(&c));
        assert_eq!(e.kind(), c.kind());
        assert!(!Arc::ptr_eq(
            &e.as_split().unwrap().field,
            &c.as_split().unwrap().field
        ));
    }

    #[test]
    fn test_wire_forms() {
        let split = Entity::new(Split::default_for(&age()));
        assert_eq!(split.predict_ref(), json!("age"));
        assert_eq!(
            split.as_split().unwrap().to_json(),
            json!({"name": "age", "split": "equiinterval", "args": [4]})
        );

        let agg = Entity::new(Aggregation::new(vec![age()], AggregationMethod::Average, "age").unwrap());
        assert_eq!(
            agg.predict_ref(),
            json!({"name": ["age"], "aggregation": "average", "yields": "age", "args": []})
        );
    }

    #[test]
    fn test_extent_published_once() {
        let e = Entity::new(Split::default_for(&age()));
        assert!(e.extent().is_none());
        assert!(e.set_extent(Extent::continuous(0.0, 1.0)).is_ok());
        assert!(e.set_extent(Extent::continuous(0.0, 2.0)).is_err());
        assert_eq!(e.extent(), Some(&Extent::continuous(0.0, 1.0)));
    }

    #[test]
    fn test_from_kind() {
        let agg = Aggregation::new(vec![sex(), age()], AggregationMethod::Average, "age").unwrap();
        let s = Split::from_kind(&EntityKind::Aggregation(agg));
        assert_eq!(s.name(), "age");
        assert_eq!(s.method, SplitMethod::EquiInterval);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(SplitMethod::parse("equidist").unwrap(), SplitMethod::EquiInterval);
        assert_eq!(FilterMethod::parse("in").unwrap(), FilterMethod::In);
        assert!(AggregationMethod::parse("median").is_err());
    }
}
