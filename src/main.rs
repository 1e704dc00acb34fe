//! Endpoint tester - declarative HTTP endpoint test runner
//!
//! Reads an ordered list of endpoint tests from a YAML or JSON file, issues
//! each request in turn and verifies the responses.

use clap::Parser;
use colored::Colorize;
use endpoint_tester::common::logging;
use endpoint_tester::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "endpoint-tester", about = "Declarative HTTP endpoint test runner")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.command.verbose());

    match cli::dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {e}", "Error:".red());
            std::process::exit(cli::EXIT_ERROR);
        }
    }
}
