//! ObservationScope for pipeline stages
//!
//! - `{NAME}_BEGIN` on creation
//! - `{NAME}_COMPLETE` or `{NAME}_FAILED` when closed
//! - `{NAME}_INCOMPLETE` if dropped while open
//!
//! Scopes own their data so they can be held across `.await` points.

use std::time::Instant;

use super::logger::{Logger, Severity};

/// A scope that logs the begin and end of a pipeline stage
pub struct ObservationScope {
    name: String,
    fields: Vec<(String, String)>,
    timer: Timer,
    closed: bool,
}

impl ObservationScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_fields(name, &[])
    }

    /// Scope whose fields are repeated on every record it logs
    pub fn with_fields(name: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        let scope = Self {
            name: name.into(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timer: Timer::new(),
            closed: false,
        };
        scope.emit(Severity::Info, "BEGIN", &[]);
        scope
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Logs `{NAME}_COMPLETE` with the elapsed time and `extra` fields
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.closed = true;
        let elapsed = self.timer.elapsed_ms();
        let mut fields = vec![("elapsed_ms", elapsed.as_str())];
        fields.extend_from_slice(extra);
        self.emit(Severity::Info, "COMPLETE", &fields);
    }

    /// Logs `{NAME}_FAILED` at ERROR level
    pub fn fail(mut self, reason: &str) {
        self.closed = true;
        self.emit(Severity::Error, "FAILED", &[("reason", reason)]);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        let mut fields: Vec<(&str, &str)> = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.extend_from_slice(extra);
        Logger::log(severity, &event, &fields);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.closed {
            self.emit(
                Severity::Warn,
                "INCOMPLETE",
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall clock timer for elapsed-time fields
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
