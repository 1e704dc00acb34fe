//! Endpoint tester - declarative HTTP endpoint test runner
//!
//! Runs an ordered scenario of HTTP requests, verifies each response and
//! threads values captured from one response into later requests.

pub mod cli;
pub mod commands;
pub mod common;
pub mod http;
pub mod runner;
pub mod scenario;
pub mod vars;
pub mod verify;

// Re-export commonly used types for tests
pub use common::{Error, MatchPolicy, Result};
pub use runner::{RunOptions, ScenarioRunner, Summary};
pub use scenario::{EndpointTest, TestScenario};
pub use vars::VariableStore;
