//! Observable events of an editing context
//!
//! Events are explicit and typed. Each one maps to a fixed log event name.

use std::fmt;

use super::logger::Severity;

/// Lifecycle events of the evaluation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Context lifecycle
    /// Editing context created
    ContextCreated,
    /// Model header loaded
    HeaderLoaded,
    /// Configuration loaded from file
    ConfigLoaded,

    // Scheduling
    /// An edit scheduled a re-evaluation
    EvaluationScheduled,
    /// A scheduled evaluation was replaced by a newer edit before it started
    EvaluationSuperseded,
    /// Evaluation started
    EvaluationStarted,
    /// Evaluation published its result
    EvaluationComplete,
    /// Evaluation failed
    EvaluationFailed,
    /// A finished evaluation was older than the current query
    EvaluationStale,

    // Stages
    /// Template expanded into the query grid
    TemplateExpanded,
    /// Query grid exceeds the cell cap
    CellCapExceeded,
    /// Facet fetch begins
    FacetFetchBegin,
    /// Facet fetch complete
    FacetFetchComplete,
    /// Facet switched off or had nothing to show
    FacetSkipped,
    /// Extents published onto entities
    ExtentsPublished,
}

impl Event {
    /// Returns the log event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ContextCreated => "CONTEXT_CREATED",
            Event::HeaderLoaded => "HEADER_LOADED",
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::EvaluationScheduled => "EVALUATION_SCHEDULED",
            Event::EvaluationSuperseded => "EVALUATION_SUPERSEDED",
            Event::EvaluationStarted => "EVALUATION_BEGIN",
            Event::EvaluationComplete => "EVALUATION_COMPLETE",
            Event::EvaluationFailed => "EVALUATION_FAILED",
            Event::EvaluationStale => "EVALUATION_STALE",

            Event::TemplateExpanded => "TEMPLATE_EXPANDED",
            Event::CellCapExceeded => "CELL_CAP_EXCEEDED",
            Event::FacetFetchBegin => "FACET_FETCH_BEGIN",
            Event::FacetFetchComplete => "FACET_FETCH_COMPLETE",
            Event::FacetSkipped => "FACET_SKIPPED",
            Event::ExtentsPublished => "EXTENTS_PUBLISHED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::EvaluationFailed => Severity::Error,
            Event::CellCapExceeded | Event::EvaluationStale => Severity::Warn,
            Event::FacetFetchBegin | Event::FacetFetchComplete | Event::FacetSkipped => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
