//! Error types for the endpoint tester
//!
//! Every per-endpoint failure is a variant here so the runner can report it
//! against the endpoint name and keep going. Only scenario loading and
//! configuration problems are fatal to a whole run.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the endpoint tester
#[derive(Error, Debug)]
pub enum Error {
    // === Scenario Errors ===
    #[error("Failed to load test scenario '{path}': {reason}")]
    ScenarioLoad { path: String, reason: String },

    // === Request Errors ===
    #[error("Failed to build request: {0}")]
    RequestConstruction(String),

    #[error("Multipart field '{field}' must be a string, got {found}")]
    InvalidFieldType { field: String, found: String },

    #[error("Request failed: {0}")]
    Transport(String),

    // === Verification Errors ===
    #[error("expected code {expected}, received {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("Failed to decode response body: {0}")]
    ResponseDecode(String),

    #[error("response key '{key}' not found in the actual response")]
    ExpectedKeyMissing { key: String },

    #[error("response key '{key}' does not match the expected value. Expected: {expected}, Actual: {actual}")]
    ValueMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("response key '{key}' is not part of the expected response")]
    UnexpectedKey { key: String },

    #[error("response variable '{field}' not found in the response")]
    MissingResponseField { field: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a scenario load error for a file path
    pub fn scenario_load(path: &std::path::Path, reason: impl ToString) -> Self {
        Self::ScenarioLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a value mismatch error
    pub fn value_mismatch(key: &str, expected: &str, actual: &str) -> Self {
        Self::ValueMismatch {
            key: key.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an invalid multipart field type error
    pub fn invalid_field_type(field: &str, found: &str) -> Self {
        Self::InvalidFieldType {
            field: field.to_string(),
            found: found.to_string(),
        }
    }

    /// Stable identifier for machine-readable reports
    pub fn code(&self) -> &'static str {
        match self {
            Error::ScenarioLoad { .. } => "SCENARIO_LOAD",
            Error::RequestConstruction(_) => "REQUEST_CONSTRUCTION",
            Error::InvalidFieldType { .. } => "INVALID_FIELD_TYPE",
            Error::Transport(_) => "TRANSPORT",
            Error::StatusMismatch { .. } => "STATUS_MISMATCH",
            Error::ResponseDecode(_) => "RESPONSE_DECODE",
            Error::ExpectedKeyMissing { .. } => "EXPECTED_KEY_MISSING",
            Error::ValueMismatch { .. } => "VALUE_MISMATCH",
            Error::UnexpectedKey { .. } => "UNEXPECTED_KEY",
            Error::MissingResponseField { .. } => "MISSING_RESPONSE_FIELD",
            Error::Config(_) | Error::ConfigParse(_) => "CONFIG",
            Error::Json(_) => "JSON",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Error::RequestConstruction(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}
