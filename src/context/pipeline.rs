//! Evaluation pipeline
//!
//! One evaluation turns a query spec into linked result collections.
//!
//! # Stages (strict order)
//!
//! 1. Resolve the spec in a fresh [`Session`]
//! 2. Expand the template into the query grid
//! 3. Plan: compile or derive every facet for every cell
//! 4. Fetch all planned queries concurrently; any failure aborts
//! 5. Aggregate extents across all collections and publish them
//!
//! The session lives only as long as the evaluation. A failed evaluation
//! drops it together with every entity it created.

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use uuid::Uuid;

use super::backend::ModelBackend;
use super::config::ContextConfig;
use super::errors::{ContextError, ContextResult};
use crate::compiler::{compile_predict, compile_sample, Compiled};
use crate::executor::{aggregate, FacetCollection, FacetTables, LinkedExtents, ResultTable};
use crate::facets::{derive_joint, derive_marginal, DeriveResult, Facet, FacetShape};
use crate::observability::{Event, Logger, MetricsRegistry, ObservationScope};
use crate::pql::{BackendQuery, DataCategory, SelectOptions, Session};
use crate::schema::ModelHeader;
use crate::vismel::{expand, Axis, Query, QueryGrid, QuerySpec};

/// Result of one successful evaluation
#[derive(Debug)]
pub struct Evaluation {
    pub session_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub query: Query,
    pub grid: QueryGrid,
    /// One collection per facet, in [`Facet::ALL`] order
    pub collections: Vec<FacetCollection>,
    pub extents: LinkedExtents,
}

impl Evaluation {
    pub fn collection(&self, facet: Facet) -> Option<&FacetCollection> {
        self.collections.iter().find(|c| c.facet() == facet)
    }
}

/// What to do for one table slot of a cell
enum Slot {
    /// The facet has nothing to show for this cell
    Skip,
    /// Facet is switched off: empty table with the compiled columns
    Placeholder(Compiled),
    Fetch(Compiled),
}

struct FacetPlan {
    facet: Facet,
    active: bool,
    cells: Vec<Vec<Slot>>,
}

/// Runs one full evaluation of `spec` against `backend`
pub async fn evaluate(
    spec: &QuerySpec,
    header: &ModelHeader,
    backend: &dyn ModelBackend,
    config: &ContextConfig,
    metrics: &MetricsRegistry,
) -> ContextResult<Evaluation> {
    let mut session = Session::new();
    let session_id = session.id().to_string();

    let query = spec.resolve(header, &mut session)?;
    let grid = match expand(&query, &mut session, config.max_cells) {
        Ok(grid) => grid,
        Err(e) if e.is_cell_cap() => {
            let reason = e.to_string();
            Logger::event(
                Event::CellCapExceeded,
                &[("session", session_id.as_str()), ("reason", reason.as_str())],
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    metrics.add_cells_expanded(grid.len() as u64);
    let (height, width) = (grid.height().to_string(), grid.width().to_string());
    Logger::event(
        Event::TemplateExpanded,
        &[
            ("session", session_id.as_str()),
            ("height", height.as_str()),
            ("width", width.as_str()),
        ],
    );

    let mut plans = Vec::with_capacity(Facet::ALL.len());
    for facet in Facet::ALL {
        let plan = plan_facet(facet, &grid, &mut session, config)?;
        if !plan.active {
            metrics.increment_facets_skipped();
            Logger::event(Event::FacetSkipped, &[("facet", facet.as_str())]);
        }
        plans.push(plan);
    }

    let jobs: Vec<&Compiled> = plans
        .iter()
        .flat_map(|p| p.cells.iter().flatten())
        .filter_map(|slot| match slot {
            Slot::Fetch(c) => Some(c),
            _ => None,
        })
        .collect();
    metrics.add_backend_queries(jobs.len() as u64);

    let scope = ObservationScope::with_fields("FETCH", &[("session", session_id.as_str())]);
    for plan in plans.iter().filter(|p| p.active) {
        Logger::event(Event::FacetFetchBegin, &[("facet", plan.facet.as_str())]);
    }
    let fetched = match try_join_all(jobs.iter().map(|c| fetch(backend, c))).await {
        Ok(tables) => tables,
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(e);
        }
    };
    let queries = jobs.len().to_string();
    scope.complete_with_fields(&[("queries", queries.as_str())]);
    for plan in plans.iter().filter(|p| p.active) {
        Logger::event(Event::FacetFetchComplete, &[("facet", plan.facet.as_str())]);
    }

    let mut fetched = fetched.into_iter();
    let collections: Vec<FacetCollection> = plans
        .into_iter()
        .map(|plan| assemble(plan, &grid, &mut fetched))
        .collect();

    let mut aggregator = aggregate(&collections)?;
    for (_, _, cell) in grid.iter() {
        for entity in cell.entities() {
            aggregator.register(&entity);
        }
    }
    let extents = aggregator.finish(config.extent_padding)?;
    let published = extents.publish()?.to_string();
    let yields = extents.extents().len().to_string();
    Logger::event(
        Event::ExtentsPublished,
        &[
            ("session", session_id.as_str()),
            ("entities", published.as_str()),
            ("yields", yields.as_str()),
        ],
    );

    Ok(Evaluation {
        session_id: session.id(),
        finished_at: Utc::now(),
        query,
        grid,
        collections,
        extents,
    })
}

/// Backend queries of one facet, per grid cell in row-major order.
///
/// Marginal facets hold the rows and cols query of each cell. A `None`
/// slot has nothing to fetch. The facet toggle is ignored.
pub fn facet_queries(
    facet: Facet,
    grid: &QueryGrid,
    session: &mut Session,
    config: &ContextConfig,
) -> ContextResult<Vec<Vec<Option<BackendQuery>>>> {
    let plan = plan_facet(facet, grid, session, config)?;
    Ok(plan
        .cells
        .into_iter()
        .map(|slots| {
            slots
                .into_iter()
                .map(|slot| match slot {
                    Slot::Skip => None,
                    Slot::Placeholder(c) | Slot::Fetch(c) => Some(c.query().clone()),
                })
                .collect()
        })
        .collect())
}

async fn fetch(backend: &dyn ModelBackend, compiled: &Compiled) -> ContextResult<ResultTable> {
    let response = backend.execute(compiled.query()).await?;
    Ok(ResultTable::from_response(response, compiled)?)
}

fn plan_facet(
    facet: Facet,
    grid: &QueryGrid,
    session: &mut Session,
    config: &ContextConfig,
) -> ContextResult<FacetPlan> {
    let active = config.facets.is_active(facet);
    let variant = facet.variant();
    let resolution = config.variant(variant);

    let mut cells = Vec::with_capacity(grid.len());
    for cell in grid.cells() {
        let model = variant.model_name(&cell.source);
        let wrap = |compiled: Compiled| {
            let compiled = compiled.with_model(&model);
            if active {
                Slot::Fetch(compiled)
            } else {
                Slot::Placeholder(compiled)
            }
        };
        let slots = match facet.shape() {
            FacetShape::Aggregation => vec![wrap(compile_predict(cell)?)],
            FacetShape::Samples(category) => {
                vec![wrap(compile_sample(cell, select_options(category, config))?)]
            }
            FacetShape::Marginal => {
                let mut slots = Vec::with_capacity(2);
                for axis in [Axis::Rows, Axis::Cols] {
                    let derived =
                        derive_marginal(cell, axis, session, resolution.marginal_resolution);
                    slots.push(derived_slot(derived, &wrap)?);
                }
                slots
            }
            FacetShape::Joint => {
                let derived = derive_joint(cell, session, resolution.density_resolution);
                vec![derived_slot(derived, &wrap)?]
            }
        };
        cells.push(slots);
    }
    Ok(FacetPlan {
        facet,
        active,
        cells,
    })
}

fn derived_slot(
    derived: DeriveResult<Query>,
    wrap: impl Fn(Compiled) -> Slot,
) -> ContextResult<Slot> {
    match derived {
        Ok(query) => Ok(wrap(compile_predict(&query)?)),
        Err(e) if e.is_skip() => Ok(Slot::Skip),
        Err(e) => Err(ContextError::Derive(e)),
    }
}

fn select_options(category: DataCategory, config: &ContextConfig) -> SelectOptions {
    SelectOptions {
        data_category: category,
        data_point_limit: config.data_point_limit,
        number_of_samples: match category {
            DataCategory::ModelSamples => Some(config.number_of_samples),
            _ => None,
        },
    }
}

fn assemble(
    plan: FacetPlan,
    grid: &QueryGrid,
    fetched: &mut impl Iterator<Item = ResultTable>,
) -> FacetCollection {
    let mut table = |slot: Slot| match slot {
        Slot::Skip => ResultTable::default(),
        Slot::Placeholder(c) => ResultTable::empty(&c),
        Slot::Fetch(_) => fetched.next().unwrap_or_default(),
    };
    let cells = plan
        .cells
        .into_iter()
        .map(|slots| {
            let mut slots = slots.into_iter();
            let first = slots.next().map(&mut table).unwrap_or_default();
            match slots.next() {
                Some(second) => FacetTables::Marginal {
                    rows: first,
                    cols: table(second),
                },
                None => FacetTables::Single(first),
            }
        })
        .collect();

    if plan.active {
        FacetCollection::new(plan.facet, grid.height(), grid.width(), cells)
    } else {
        FacetCollection::inactive(plan.facet, grid.height(), grid.width(), cells)
    }
}
