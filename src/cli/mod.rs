//! CLI module for vislink
//!
//! Provides command-line interface for:
//! - compile: print the backend queries of one facet
//! - expand: print the query grid
//! - evaluate: run the full pipeline against the in-process backend

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, evaluate, expand_grid, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{load_inputs, write_error, write_response};
