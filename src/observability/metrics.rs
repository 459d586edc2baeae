//! Metrics registry
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Lock free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by all editing contexts
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    evaluations_started: AtomicU64,
    evaluations_completed: AtomicU64,
    evaluations_failed: AtomicU64,
    evaluations_superseded: AtomicU64,
    evaluations_stale: AtomicU64,
    backend_queries: AtomicU64,
    facets_skipped: AtomicU64,
    cells_expanded: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_evaluations_started(&self) {
        self.evaluations_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evaluations_completed(&self) {
        self.evaluations_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evaluations_failed(&self) {
        self.evaluations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evaluations_superseded(&self) {
        self.evaluations_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_evaluations_stale(&self) {
        self.evaluations_stale.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_backend_queries(&self, n: u64) {
        self.backend_queries.fetch_add(n, Ordering::Relaxed);
    }

    pub fn increment_facets_skipped(&self) {
        self.facets_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cells_expanded(&self, n: u64) {
        self.cells_expanded.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations_started: self.evaluations_started.load(Ordering::Relaxed),
            evaluations_completed: self.evaluations_completed.load(Ordering::Relaxed),
            evaluations_failed: self.evaluations_failed.load(Ordering::Relaxed),
            evaluations_superseded: self.evaluations_superseded.load(Ordering::Relaxed),
            evaluations_stale: self.evaluations_stale.load(Ordering::Relaxed),
            backend_queries: self.backend_queries.load(Ordering::Relaxed),
            facets_skipped: self.facets_skipped.load(Ordering::Relaxed),
            cells_expanded: self.cells_expanded.load(Ordering::Relaxed),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub evaluations_started: u64,
    pub evaluations_completed: u64,
    pub evaluations_failed: u64,
    pub evaluations_superseded: u64,
    pub evaluations_stale: u64,
    pub backend_queries: u64,
    pub facets_skipped: u64,
    pub cells_expanded: u64,
}
