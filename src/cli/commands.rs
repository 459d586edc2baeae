//! CLI command implementations
//!
//! Each command loads its inputs, runs one stage of the pipeline and
//! writes a single JSON response. `evaluate` runs against the in-process
//! backend, so no model service is needed.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::context::{facet_queries, ContextConfig, DummyBackend, EditingContext, Evaluation};
use crate::facets::Facet;
use crate::observability::{Logger, MetricsRegistry};
use crate::pql::Session;
use crate::schema::ModelHeader;
use crate::vismel::{expand, QueryGrid, QuerySpec};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{load_inputs, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    Logger::set_min_severity(cli.log_level);
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Runs a command and returns its response payload
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Compile {
            header,
            query,
            facet,
            config,
        } => {
            let (header, spec, config) = load_inputs(&header, &query, config.as_deref())?;
            let facet = Facet::parse(&facet)
                .ok_or_else(|| CliError::invalid_argument(format!("Unknown facet '{}'", facet)))?;
            compile(&header, &spec, facet, &config)
        }
        Command::Expand {
            header,
            query,
            max_cells,
        } => {
            let (header, spec, _) = load_inputs(&header, &query, None)?;
            expand_grid(&header, &spec, max_cells)
        }
        Command::Evaluate {
            header,
            query,
            config,
        } => {
            let (header, spec, config) = load_inputs(&header, &query, config.as_deref())?;
            evaluate(header, &spec, config)
        }
    }
}

/// Backend queries of one facet for every grid cell
pub fn compile(
    header: &ModelHeader,
    spec: &QuerySpec,
    facet: Facet,
    config: &ContextConfig,
) -> CliResult<Value> {
    config.validate()?;
    let mut session = Session::new();
    let query = spec.resolve(header, &mut session)?;
    let grid = expand(&query, &mut session, config.max_cells)?;
    let queries = facet_queries(facet, &grid, &mut session, config)?;

    let cells: Vec<Value> = grid
        .iter()
        .zip(queries)
        .map(|((row, col, _), slots)| {
            let slots: Vec<Value> = slots
                .iter()
                .map(|q| q.as_ref().map_or(Value::Null, |q| q.to_json()))
                .collect();
            json!({"row": row, "col": col, "queries": slots})
        })
        .collect();

    Ok(json!({
        "facet": facet.as_str(),
        "height": grid.height(),
        "width": grid.width(),
        "cells": cells,
    }))
}

/// Grid shape and the NSF of both axes
pub fn expand_grid(header: &ModelHeader, spec: &QuerySpec, max_cells: usize) -> CliResult<Value> {
    if max_cells == 0 {
        return Err(CliError::invalid_argument("max_cells must be positive"));
    }
    let mut session = Session::new();
    let query = spec.resolve(header, &mut session)?;
    let grid = expand(&query, &mut session, max_cells)?;
    Ok(grid_json(&grid))
}

fn grid_json(grid: &QueryGrid) -> Value {
    let rows: Vec<String> = grid.row_cells().iter().map(|c| c.to_string()).collect();
    let cols: Vec<String> = grid.col_cells().iter().map(|c| c.to_string()).collect();
    json!({
        "height": grid.height(),
        "width": grid.width(),
        "rows": rows,
        "cols": cols,
    })
}

/// Runs the full pipeline once against the in-process backend
pub fn evaluate(header: ModelHeader, spec: &QuerySpec, config: ContextConfig) -> CliResult<Value> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

    let metrics = Arc::new(MetricsRegistry::new());
    let backend = Arc::new(DummyBackend::new().with_model(header.clone()));
    let evaluation = rt.block_on(async {
        let context = EditingContext::with_header(header, backend, config, Arc::clone(&metrics));
        context.evaluate_now(spec).await
    })?;

    let mut out = evaluation_json(&evaluation);
    out["metrics"] = serde_json::to_value(metrics.snapshot())?;
    Ok(out)
}

fn evaluation_json(evaluation: &Evaluation) -> Value {
    let facets: Vec<Value> = evaluation
        .collections
        .iter()
        .map(|c| {
            let rows: usize = c.tables().map(|t| t.len()).sum();
            json!({"facet": c.facet().as_str(), "active": c.is_active(), "rows": rows})
        })
        .collect();

    json!({
        "session": evaluation.session_id.to_string(),
        "finished_at": evaluation.finished_at.to_rfc3339(),
        "grid": grid_json(&evaluation.grid),
        "facets": facets,
        "extents": evaluation.extents.extents(),
    })
}
