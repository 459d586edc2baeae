//! Facet derivation
//!
//! A facet is one of the parallel renderings of an atomic query: the
//! aggregations themselves, samples of training data, test data or the
//! model, the marginal densities along each axis and the joint density of
//! both axes. Model facets query the model, data facets its empirical
//! counterpart.

mod errors;
mod joint;
mod marginal;

use serde::{Deserialize, Serialize};

use crate::pql::DataCategory;

pub use errors::{DeriveError, DeriveResult};
pub use joint::derive_joint;
pub use marginal::derive_marginal;

/// Facets of the visualization, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Aggregations,
    DataAggregations,
    TrainingData,
    TestData,
    ModelSamples,
    Marginals,
    DataMarginals,
    Contour,
    DataDensity,
}

/// Whether a facet queries the model or its empirical counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Model,
    Data,
}

/// How the queries of a facet are built from an atomic cell query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetShape {
    /// The cell query itself, as predict query
    Aggregation,
    /// The cell query as select query
    Samples(DataCategory),
    /// One marginal density query per axis
    Marginal,
    /// The joint density query
    Joint,
}

/// Prefix of the empirical model that belongs to a model
pub const EMPIRICAL_PREFIX: &str = "emp_";

impl Facet {
    pub const ALL: [Facet; 9] = [
        Facet::Aggregations,
        Facet::DataAggregations,
        Facet::TrainingData,
        Facet::TestData,
        Facet::ModelSamples,
        Facet::Marginals,
        Facet::DataMarginals,
        Facet::Contour,
        Facet::DataDensity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Facet::Aggregations => "aggregations",
            Facet::DataAggregations => "data_aggregations",
            Facet::TrainingData => "training_data",
            Facet::TestData => "test_data",
            Facet::ModelSamples => "model_samples",
            Facet::Marginals => "marginals",
            Facet::DataMarginals => "data_marginals",
            Facet::Contour => "contour",
            Facet::DataDensity => "data_density",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Facet::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub fn variant(&self) -> Variant {
        match self {
            Facet::DataAggregations | Facet::DataMarginals | Facet::DataDensity => Variant::Data,
            _ => Variant::Model,
        }
    }

    pub fn shape(&self) -> FacetShape {
        match self {
            Facet::Aggregations | Facet::DataAggregations => FacetShape::Aggregation,
            Facet::TrainingData => FacetShape::Samples(DataCategory::Training),
            Facet::TestData => FacetShape::Samples(DataCategory::Test),
            Facet::ModelSamples => FacetShape::Samples(DataCategory::ModelSamples),
            Facet::Marginals | Facet::DataMarginals => FacetShape::Marginal,
            Facet::Contour | Facet::DataDensity => FacetShape::Joint,
        }
    }
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Model => "model",
            Variant::Data => "data",
        }
    }

    /// Name of the backend model this variant queries
    pub fn model_name(&self, model: &str) -> String {
        match self {
            Variant::Model => model.to_string(),
            Variant::Data => format!("{EMPIRICAL_PREFIX}{model}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_names() {
        for f in Facet::ALL {
            assert_eq!(Facet::parse(f.as_str()), Some(f));
        }
        assert_eq!(Facet::parse("histogram"), None);
        assert_eq!(Facet::DataDensity.variant(), Variant::Data);
        assert_eq!(Facet::DataDensity.shape(), FacetShape::Joint);
        assert_eq!(
            Facet::TestData.shape(),
            FacetShape::Samples(DataCategory::Test)
        );
        assert_eq!(Variant::Data.model_name("census"), "emp_census");
    }
}
