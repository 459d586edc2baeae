//! Observability
//!
//! - Structured logging (JSON lines)
//! - Monotonic metrics
//! - Lifecycle event tracing
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes evaluation results
//! 2. Logging is synchronous
//! 3. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use vislink::observability::{Event, Logger, ObservationScope};
//!
//! Logger::event(Event::HeaderLoaded, &[("model", "census")]);
//!
//! let scope = ObservationScope::new("FETCH");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Logs a lifecycle event
pub fn log_event(event: Event) {
    Logger::event(event, &[]);
}

/// Logs a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::event(event, fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ContextCreated);
        log_event_with_fields(Event::HeaderLoaded, &[("model", "census")]);
    }
}
