//! CLI command handling
//!
//! Loads scenarios and configuration, runs them and maps the outcome to an
//! exit code.

use colored::Colorize;
use std::path::Path;

use crate::commands::{Commands, RunArgs};
use crate::common::{Config, Result};
use crate::http::HttpTransport;
use crate::runner::{ConsoleReporter, QuietReporter, RunOptions, ScenarioReport, ScenarioRunner};
use crate::scenario::{lint, TestScenario};

/// Every endpoint ran (some may have failed)
pub const EXIT_COMPLETED: i32 = 0;
/// A fatal error, or `check` found problems
pub const EXIT_ERROR: i32 = 1;
/// Execution was cut short by stop-on-failure
pub const EXIT_ABORTED: i32 = 2;

/// Dispatch a CLI command, returning the process exit code
pub async fn dispatch(command: Commands) -> Result<i32> {
    match command {
        Commands::Run(args) => run(args).await,
        Commands::Check { test_file, vars } => {
            let predefined: Vec<String> = vars.into_iter().map(|(name, _)| name).collect();
            check(&test_file, &predefined)
        }
    }
}

async fn run(args: RunArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let scenario = TestScenario::load(&args.test_file)?;
    tracing::debug!(path = %args.test_file.display(), endpoints = scenario.endpoints.len(), "loaded scenario");

    let mut http = config.http;
    if let Some(timeout) = args.timeout {
        http.timeout_secs = timeout;
    }
    let transport = HttpTransport::new(&http)?;

    let options = RunOptions {
        stop_on_failure: args.stop_on_failure || config.run.stop_on_failure,
        match_policy: args.match_mode.unwrap_or(config.verify.match_mode),
        seed_variables: args.vars,
    };
    let runner = ScenarioRunner::new(transport, options);

    let report = if args.json {
        let report = runner.run(&scenario, &mut QuietReporter).await;
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
        report
    } else {
        runner
            .run(&scenario, &mut ConsoleReporter::new(args.details))
            .await
    };

    Ok(exit_code(&report))
}

/// Map a finished run to the process exit code
pub fn exit_code(report: &ScenarioReport) -> i32 {
    if report.summary.aborted {
        EXIT_ABORTED
    } else {
        EXIT_COMPLETED
    }
}

fn check(path: &Path, predefined: &[String]) -> Result<i32> {
    let scenario = TestScenario::load(path)?;
    let issues = lint(&scenario, predefined);

    println!(
        "\n{} {}",
        "Checking Scenario:".blue().bold(),
        scenario.display_name(path).white().bold()
    );

    for endpoint in &scenario.endpoints {
        let endpoint_issues: Vec<_> = issues
            .iter()
            .filter(|i| i.endpoint == endpoint.name)
            .collect();
        if endpoint_issues.is_empty() {
            println!("  {} {}", "✓".green(), endpoint.name);
        } else {
            println!("  {} {}", "✗".red(), endpoint.name);
            for issue in endpoint_issues {
                println!("      {}: {}", issue.field.dimmed(), issue.message);
            }
        }
    }

    if issues.is_empty() {
        println!("\n{}", "No problems found".green().bold());
        Ok(EXIT_COMPLETED)
    } else {
        println!(
            "\n{}",
            format!("{} problem(s) found", issues.len()).red().bold()
        );
        Ok(EXIT_ERROR)
    }
}
