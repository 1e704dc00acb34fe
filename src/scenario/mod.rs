//! Scenario model
//!
//! A scenario is an ordered list of endpoint tests that share one variable
//! store. Order is execution order.

mod config;
mod lint;

pub use config::{EndpointTest, TestScenario};
pub use lint::{lint, LintIssue};
