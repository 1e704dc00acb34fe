//! Scenario runner
//!
//! Wires substitution, request building, the transport and verification
//! together for each endpoint, and aggregates the results.

mod executor;
mod report;

pub use executor::{RunOptions, ScenarioRunner};
pub use report::{
    ConsoleReporter, EndpointOutcome, QuietReporter, Reporter, ScenarioReport, Stage, Summary,
};
