//! CLI argument definitions using clap
//!
//! Commands:
//! - vislink compile --header <path> --query <path> [--facet <name>]
//! - vislink expand --header <path> --query <path>
//! - vislink evaluate --header <path> --query <path> [--config <path>]
//!
//! `--log-level` applies to every command. INFO records go to stdout next to
//! the response, so scripts usually pass `--log-level warn`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::observability::Severity;

/// vislink - linked query compilation for model visualizations
#[derive(Parser, Debug)]
#[command(name = "vislink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lowest severity written to the log (trace, info, warn, error, fatal)
    #[arg(long, global = true, default_value = "info", value_parser = parse_severity)]
    pub log_level: Severity,

    #[command(subcommand)]
    pub command: Command,
}

fn parse_severity(s: &str) -> Result<Severity, String> {
    Severity::parse(s).ok_or_else(|| format!("unknown log level '{}'", s))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the backend queries of every grid cell
    Compile {
        /// Path to the model header JSON
        #[arg(long)]
        header: PathBuf,

        /// Path to the query JSON
        #[arg(long)]
        query: PathBuf,

        /// Facet to compile (default: aggregations)
        #[arg(long, default_value = "aggregations")]
        facet: String,

        /// Path to the context configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the grid shape and the NSF of both axes
    Expand {
        /// Path to the model header JSON
        #[arg(long)]
        header: PathBuf,

        /// Path to the query JSON
        #[arg(long)]
        query: PathBuf,

        /// Largest grid to expand to
        #[arg(long, default_value_t = 400)]
        max_cells: usize,
    },

    /// Run the full pipeline against the in-process backend
    Evaluate {
        /// Path to the model header JSON
        #[arg(long)]
        header: PathBuf,

        /// Path to the query JSON
        #[arg(long)]
        query: PathBuf,

        /// Path to the context configuration JSON
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_defaults() {
        let cli = Cli::try_parse_from([
            "vislink", "compile", "--header", "h.json", "--query", "q.json",
        ])
        .unwrap();
        match cli.command {
            Command::Compile { facet, config, .. } => {
                assert_eq!(facet, "aggregations");
                assert!(config.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from([
            "vislink", "expand", "--header", "h.json", "--query", "q.json",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Severity::Info);

        let cli = Cli::try_parse_from([
            "vislink", "evaluate", "--header", "h.json", "--query", "q.json", "--log-level", "WARN",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Severity::Warn);

        assert!(Cli::try_parse_from([
            "vislink", "--log-level", "loud", "expand", "--header", "h.json", "--query", "q.json",
        ])
        .is_err());
    }

    #[test]
    fn test_header_required() {
        assert!(Cli::try_parse_from(["vislink", "expand", "--query", "q.json"]).is_err());
    }
}
