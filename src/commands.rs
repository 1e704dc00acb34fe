//! CLI command definitions
//!
//! Defines the clap commands for the endpoint tester CLI.

use clap::{Args, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use crate::common::MatchPolicy;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a test scenario against live endpoints
    Run(RunArgs),

    /// Check a scenario for placeholders no earlier endpoint defines
    Check {
        /// Path to the YAML or JSON scenario file
        #[arg(long = "test-file", short = 't', alias = "testFile")]
        test_file: PathBuf,

        /// Variable supplied from outside the scenario (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, Value)>,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Path to the YAML or JSON scenario file
    #[arg(long = "test-file", short = 't', alias = "testFile")]
    pub test_file: PathBuf,

    /// Display request and response details
    #[arg(long, short = 'd')]
    pub details: bool,

    /// Abort the remaining endpoints after the first failure
    #[arg(long, alias = "stopOnFailure")]
    pub stop_on_failure: bool,

    /// How expected responses are compared (default: superset)
    #[arg(long, value_enum)]
    pub match_mode: Option<MatchPolicy>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seed a variable before the first endpoint (repeatable)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, Value)>,

    /// Print the report as JSON instead of colored text
    #[arg(long)]
    pub json: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Commands {
    /// Whether debug logging should be enabled by default
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Run(args) => args.details,
            Commands::Check { .. } => false,
        }
    }
}

/// Parse a `key=value` pair; the value is always bound as a string
fn parse_var(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{}'", s));
    }
    Ok((key.to_string(), Value::String(value.to_string())))
}
