//! Editing context
//!
//! One context per open visualization. Edits are debounced: each submitted
//! spec bumps the generation counter and schedules an evaluation after the
//! quiet period. A scheduled evaluation that is overtaken by a newer edit
//! before it starts never runs. An evaluation that is overtaken while in
//! flight runs to completion and its result is discarded as stale.
//!
//! Contexts share only the backend, the configuration and the metrics.
//! Sessions, entities and extents are private to each evaluation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

use super::backend::ModelBackend;
use super::config::ContextConfig;
use super::errors::{ContextError, ContextResult};
use super::pipeline::{evaluate, Evaluation};
use crate::observability::{Event, Logger, MetricsRegistry};
use crate::schema::ModelHeader;
use crate::vismel::QuerySpec;

/// User-visible failure of the latest evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub code: &'static str,
    pub message: String,
}

/// Published state of a context
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    /// Generation of the last settled evaluation
    pub generation: u64,
    /// Latest successful evaluation. Kept when a later one fails.
    pub evaluation: Option<Arc<Evaluation>>,
    /// Failure of the last settled evaluation, if it failed
    pub failure: Option<Failure>,
}

struct Inner {
    id: Uuid,
    header: ModelHeader,
    backend: Arc<dyn ModelBackend>,
    config: ContextConfig,
    metrics: Arc<MetricsRegistry>,
    generation: AtomicU64,
    state: watch::Sender<ContextState>,
}

/// Debounced evaluation pipeline for one visualization
#[derive(Clone)]
pub struct EditingContext {
    inner: Arc<Inner>,
}

impl EditingContext {
    /// Creates a context for `model`, loading its header from the backend
    pub async fn open(
        model: &str,
        backend: Arc<dyn ModelBackend>,
        config: ContextConfig,
        metrics: Arc<MetricsRegistry>,
    ) -> ContextResult<Self> {
        config.validate()?;
        let header = backend.header(model).await?;
        let fields = header.fields().len().to_string();
        Logger::event(
            Event::HeaderLoaded,
            &[("fields", fields.as_str()), ("model", model)],
        );
        Ok(Self::with_header(header, backend, config, metrics))
    }

    /// Creates a context for an already loaded header
    pub fn with_header(
        header: ModelHeader,
        backend: Arc<dyn ModelBackend>,
        config: ContextConfig,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let (state, _) = watch::channel(ContextState::default());
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        Logger::event(
            Event::ContextCreated,
            &[("context", id_str.as_str()), ("model", header.model())],
        );
        Self {
            inner: Arc::new(Inner {
                id,
                header,
                backend,
                config,
                metrics,
                generation: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn header(&self) -> &ModelHeader {
        &self.inner.header
    }

    pub fn config(&self) -> &ContextConfig {
        &self.inner.config
    }

    /// Generation of the newest submitted spec
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Schedules an evaluation of `spec` after the debounce period.
    ///
    /// Returns the generation assigned to the edit. Must be called from
    /// within a tokio runtime.
    pub fn submit(&self, spec: QuerySpec) -> u64 {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.log(Event::EvaluationScheduled, generation);

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(inner.config.debounce_ms)).await;
            if inner.generation.load(Ordering::SeqCst) != generation {
                inner.metrics.increment_evaluations_superseded();
                log_generation(&inner, Event::EvaluationSuperseded, generation);
                return;
            }
            let _ = run(&inner, &spec, generation).await;
        });
        generation
    }

    /// Evaluates `spec` immediately, bypassing the debounce period
    pub async fn evaluate_now(&self, spec: &QuerySpec) -> ContextResult<Arc<Evaluation>> {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        run(&self.inner, spec, generation).await
    }

    pub fn subscribe(&self) -> watch::Receiver<ContextState> {
        self.inner.state.subscribe()
    }

    /// Current published state
    pub fn state(&self) -> ContextState {
        self.inner.state.borrow().clone()
    }

    /// Waits until the newest submitted generation has settled
    pub async fn settled(&self) -> ContextResult<ContextState> {
        let mut rx = self.subscribe();
        loop {
            let target = self.generation();
            {
                let state = rx.borrow_and_update();
                if state.generation >= target {
                    return Ok(state.clone());
                }
            }
            rx.changed().await.map_err(|_| ContextError::Closed)?;
        }
    }

    fn log(&self, event: Event, generation: u64) {
        log_generation(&self.inner, event, generation);
    }
}

fn log_generation(inner: &Inner, event: Event, generation: u64) {
    let context = inner.id.to_string();
    let generation = generation.to_string();
    Logger::event(
        event,
        &[("context", context.as_str()), ("generation", generation.as_str())],
    );
}

/// Runs and settles one evaluation
async fn run(inner: &Inner, spec: &QuerySpec, generation: u64) -> ContextResult<Arc<Evaluation>> {
    inner.metrics.increment_evaluations_started();
    log_generation(inner, Event::EvaluationStarted, generation);

    let result = evaluate(
        spec,
        &inner.header,
        inner.backend.as_ref(),
        &inner.config,
        &inner.metrics,
    )
    .await;

    if inner.generation.load(Ordering::SeqCst) != generation {
        inner.metrics.increment_evaluations_stale();
        log_generation(inner, Event::EvaluationStale, generation);
        return result.map(Arc::new);
    }

    match result {
        Ok(evaluation) => {
            let evaluation = Arc::new(evaluation);
            inner.metrics.increment_evaluations_completed();
            log_generation(inner, Event::EvaluationComplete, generation);
            inner.state.send_modify(|state| {
                state.generation = generation;
                state.evaluation = Some(Arc::clone(&evaluation));
                state.failure = None;
            });
            Ok(evaluation)
        }
        Err(e) => {
            inner.metrics.increment_evaluations_failed();
            let context = inner.id.to_string();
            let message = e.to_string();
            Logger::event(
                Event::EvaluationFailed,
                &[
                    ("code", e.code()),
                    ("context", context.as_str()),
                    ("reason", message.as_str()),
                ],
            );
            inner.state.send_modify(|state| {
                state.generation = generation;
                state.failure = Some(Failure {
                    code: e.code(),
                    message,
                });
            });
            Err(e)
        }
    }
}
