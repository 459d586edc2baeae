//! File input and JSON output for the CLI
//!
//! Output is a single JSON object on stdout:
//! `{"status": "ok", "data": ...}` or `{"status": "error", "code": ..., "message": ...}`.

use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::errors::CliResult;
use crate::context::ContextConfig;
use crate::schema::ModelHeader;
use crate::vismel::QuerySpec;

/// Loads a header, a query and an optional configuration
pub fn load_inputs(
    header: &Path,
    query: &Path,
    config: Option<&Path>,
) -> CliResult<(ModelHeader, QuerySpec, ContextConfig)> {
    let header = ModelHeader::load(header)?;
    let spec = QuerySpec::load(query)?;
    let config = match config {
        Some(path) => ContextConfig::load(path)?,
        None => ContextConfig::default(),
    };
    Ok((header, spec, config))
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
