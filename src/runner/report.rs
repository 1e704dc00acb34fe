//! Endpoint outcomes, scenario summary and reporters

use colored::Colorize;
use serde::Serialize;
use std::fmt;

use crate::common::Error;
use crate::http::{HttpResponse, PreparedRequest};
use crate::scenario::TestScenario;

/// Checkpoints an endpoint passes through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Substituted,
    Requested,
    StatusChecked,
    BodyChecked,
    VariablesCaptured,
    Passed,
}

/// Result of running one endpoint
#[derive(Debug)]
pub struct EndpointOutcome {
    pub name: String,
    /// Last checkpoint the endpoint cleared
    pub reached: Stage,
    /// First error encountered, if any
    pub error: Option<Error>,
}

impl EndpointOutcome {
    pub fn passed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            reached: Stage::Passed,
            error: None,
        }
    }

    pub fn failed(name: &str, reached: Stage, error: Error) -> Self {
        Self {
            name: name.to_string(),
            reached,
            error: Some(error),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts for a scenario run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
    /// Execution stopped early because of stop-on-failure
    pub aborted: bool,
    /// passed / total * 100, or `None` for an empty scenario
    pub coverage: Option<f64>,
}

impl Summary {
    pub fn tally(outcomes: &[EndpointOutcome], total: usize, aborted: bool) -> Self {
        let passed = outcomes.iter().filter(|o| o.is_passed()).count();
        let failed = outcomes.len() - passed;
        let coverage = (total > 0).then(|| passed as f64 / total as f64 * 100.0);
        Self {
            passed,
            failed,
            skipped: total.saturating_sub(outcomes.len()),
            total,
            aborted,
            coverage,
        }
    }

    pub fn coverage_display(&self) -> String {
        match self.coverage {
            Some(pct) => format!("{:.2}%", pct),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tests Passed: {} / Tests Failed: {} / Coverage: {}",
            self.passed,
            self.failed,
            self.coverage_display()
        )?;
        if self.skipped > 0 {
            write!(f, " / Tests Skipped: {}", self.skipped)?;
        }
        Ok(())
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct ScenarioReport {
    pub summary: Summary,
    pub outcomes: Vec<EndpointOutcome>,
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    name: &'a str,
    passed: bool,
    reached: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ScenarioReport {
    /// Machine-readable form of the report
    pub fn to_json(&self) -> serde_json::Value {
        let outcomes: Vec<OutcomeRecord<'_>> = self
            .outcomes
            .iter()
            .map(|o| OutcomeRecord {
                name: &o.name,
                passed: o.is_passed(),
                reached: o.reached,
                error_code: o.error.as_ref().map(Error::code),
                error: o.error.as_ref().map(|e| e.to_string()),
            })
            .collect();
        serde_json::json!({
            "summary": self.summary,
            "endpoints": outcomes,
        })
    }
}

/// Receives progress events from the runner
pub trait Reporter {
    fn scenario_started(&mut self, _scenario: &TestScenario) {}

    fn request_prepared(&mut self, _endpoint: &str, _request: &PreparedRequest) {}

    fn response_received(&mut self, _endpoint: &str, _response: &HttpResponse) {}

    fn endpoint_finished(&mut self, outcome: &EndpointOutcome);

    fn summary(&mut self, summary: &Summary);
}

/// Colored console output on stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    /// Dump every request and response
    pub details: bool,
}

impl ConsoleReporter {
    pub fn new(details: bool) -> Self {
        Self { details }
    }
}

impl Reporter for ConsoleReporter {
    fn scenario_started(&mut self, scenario: &TestScenario) {
        if let Some(name) = &scenario.name {
            println!("\n{} {}", "Running Scenario:".blue().bold(), name.white().bold());
        }
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }
    }

    fn request_prepared(&mut self, _endpoint: &str, request: &PreparedRequest) {
        if self.details {
            println!();
            for line in request.dump_lines() {
                println!("{}", format!("> {}", line).cyan());
            }
        }
    }

    fn response_received(&mut self, _endpoint: &str, response: &HttpResponse) {
        if self.details {
            println!();
            for line in response.dump_lines() {
                println!("{}", format!("< {}", line).cyan());
            }
        }
    }

    fn endpoint_finished(&mut self, outcome: &EndpointOutcome) {
        match &outcome.error {
            None => println!("{}", format!("[PASS] [{}]", outcome.name).green()),
            Some(e) => println!("{}", format!("[FAIL] [{}] {}", outcome.name, e).red()),
        }
    }

    fn summary(&mut self, summary: &Summary) {
        println!("{}", summary);
        if summary.aborted {
            println!(
                "{}",
                format!(
                    "{} remaining test(s) were not executed because stop-on-failure is set.",
                    summary.skipped
                )
                .yellow()
            );
        }
    }
}

/// Reporter that prints nothing, for machine-readable output modes
#[derive(Debug, Default)]
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn endpoint_finished(&mut self, _outcome: &EndpointOutcome) {}

    fn summary(&mut self, _summary: &Summary) {}
}
