//! Editing context configuration
//!
//! Settings shared read-only by all editing contexts: debounce delay, grid
//! cap, extent padding, per-variant density resolutions, sample limits and
//! the facet toggles.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{ContextError, ContextResult};
use crate::facets::{Facet, Variant};
use crate::observability::{Event, Logger};

/// Density resolutions of one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    /// Split count of 1-D marginal densities
    pub marginal_resolution: u32,
    /// Split count per axis of 2-D densities
    pub density_resolution: u32,
}

/// Which facets are fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetToggles {
    #[serde(default = "enabled")]
    pub aggregations: bool,
    #[serde(default)]
    pub data_aggregations: bool,
    #[serde(default = "enabled")]
    pub training_data: bool,
    #[serde(default)]
    pub test_data: bool,
    #[serde(default)]
    pub model_samples: bool,
    #[serde(default = "enabled")]
    pub marginals: bool,
    #[serde(default = "enabled")]
    pub data_marginals: bool,
    #[serde(default = "enabled")]
    pub contour: bool,
    #[serde(default)]
    pub data_density: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FacetToggles {
    fn default() -> Self {
        Self {
            aggregations: true,
            data_aggregations: false,
            training_data: true,
            test_data: false,
            model_samples: false,
            marginals: true,
            data_marginals: true,
            contour: true,
            data_density: false,
        }
    }
}

impl FacetToggles {
    pub fn is_active(&self, facet: Facet) -> bool {
        match facet {
            Facet::Aggregations => self.aggregations,
            Facet::DataAggregations => self.data_aggregations,
            Facet::TrainingData => self.training_data,
            Facet::TestData => self.test_data,
            Facet::ModelSamples => self.model_samples,
            Facet::Marginals => self.marginals,
            Facet::DataMarginals => self.data_marginals,
            Facet::Contour => self.contour,
            Facet::DataDensity => self.data_density,
        }
    }

    pub fn set(&mut self, facet: Facet, on: bool) {
        let slot = match facet {
            Facet::Aggregations => &mut self.aggregations,
            Facet::DataAggregations => &mut self.data_aggregations,
            Facet::TrainingData => &mut self.training_data,
            Facet::TestData => &mut self.test_data,
            Facet::ModelSamples => &mut self.model_samples,
            Facet::Marginals => &mut self.marginals,
            Facet::DataMarginals => &mut self.data_marginals,
            Facet::Contour => &mut self.contour,
            Facet::DataDensity => &mut self.data_density,
        };
        *slot = on;
    }

    /// Only `facets` switched on
    pub fn only(facets: &[Facet]) -> Self {
        let mut toggles = Self::default();
        for f in Facet::ALL {
            toggles.set(f, facets.contains(&f));
        }
        toggles
    }
}

/// Editing context configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Quiet period before an edit is evaluated (default: 150)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Relative padding of continuous extents (default: 0.05)
    #[serde(default = "default_extent_padding")]
    pub extent_padding: f64,

    /// Largest query grid a template may expand to (default: 400)
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,

    #[serde(default = "default_model_variant")]
    pub model: VariantConfig,

    #[serde(default = "default_data_variant")]
    pub data: VariantConfig,

    /// Row limit of select queries (default: 1000)
    #[serde(default = "default_data_point_limit")]
    pub data_point_limit: usize,

    /// Sample count of model sample queries (default: 200)
    #[serde(default = "default_number_of_samples")]
    pub number_of_samples: usize,

    #[serde(default)]
    pub facets: FacetToggles,
}

fn default_debounce_ms() -> u64 {
    150
}

fn default_extent_padding() -> f64 {
    0.05
}

fn default_max_cells() -> usize {
    400
}

fn default_model_variant() -> VariantConfig {
    VariantConfig {
        marginal_resolution: 100,
        density_resolution: 50,
    }
}

fn default_data_variant() -> VariantConfig {
    VariantConfig {
        marginal_resolution: 20,
        density_resolution: 35,
    }
}

fn default_data_point_limit() -> usize {
    1000
}

fn default_number_of_samples() -> usize {
    200
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            extent_padding: default_extent_padding(),
            max_cells: default_max_cells(),
            model: default_model_variant(),
            data: default_data_variant(),
            data_point_limit: default_data_point_limit(),
            number_of_samples: default_number_of_samples(),
            facets: FacetToggles::default(),
        }
    }
}

impl ContextConfig {
    /// Loads and validates a JSON configuration file
    pub fn load(path: &Path) -> ContextResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ContextError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse_str(&content)?;
        let path = path.display().to_string();
        Logger::event(Event::ConfigLoaded, &[("path", path.as_str())]);
        Ok(config)
    }

    pub fn parse_str(content: &str) -> ContextResult<Self> {
        let config: ContextConfig = serde_json::from_str(content)
            .map_err(|e| ContextError::Config(format!("Invalid JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ContextResult<()> {
        if !self.extent_padding.is_finite() || self.extent_padding < 0.0 {
            return Err(ContextError::Config(format!(
                "extent_padding must be a non-negative number, got {}",
                self.extent_padding
            )));
        }
        if self.max_cells == 0 {
            return Err(ContextError::Config("max_cells must be positive".into()));
        }
        if self.data_point_limit == 0 {
            return Err(ContextError::Config("data_point_limit must be positive".into()));
        }
        for (name, v) in [("model", &self.model), ("data", &self.data)] {
            if v.marginal_resolution == 0 || v.density_resolution == 0 {
                return Err(ContextError::Config(format!(
                    "{} resolutions must be positive",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn variant(&self, variant: Variant) -> &VariantConfig {
        match variant {
            Variant::Model => &self.model,
            Variant::Data => &self.data,
        }
    }
}
