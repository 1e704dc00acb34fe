//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML or JSON test scenarios.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::common::paths::is_json_file;
use crate::common::{Error, Result};

/// A complete test scenario loaded from a YAML or JSON file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TestScenario {
    /// Optional name shown in the report banner
    #[serde(default)]
    pub name: Option<String>,
    /// Optional description of what the scenario verifies
    #[serde(default)]
    pub description: Option<String>,
    /// Variables available to placeholders before the first endpoint runs
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    /// The endpoints to exercise, in execution order
    #[serde(default)]
    pub endpoints: Vec<EndpointTest>,
}

/// One planned HTTP interaction and its expectations
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EndpointTest {
    /// Name used when reporting the result
    pub name: String,
    /// Target URL, may contain placeholders
    pub url: String,
    /// HTTP method, may contain placeholders
    pub method: String,
    /// Request headers; values may contain placeholders
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON request body. `None` sends no body at all
    #[serde(default)]
    pub body: Option<Map<String, Value>>,
    /// Form fields; when non-empty the request is sent as multipart/form-data
    #[serde(default)]
    pub multipart_fields: Option<Map<String, Value>>,
    /// Status code the response must carry
    pub expected_status: u16,
    /// Keys the decoded response body must contain, with their values
    #[serde(default)]
    pub expected_response: Option<Map<String, Value>>,
    /// Local variable name -> top-level response field to capture
    #[serde(default)]
    pub response_variables: Option<BTreeMap<String, String>>,
}

impl EndpointTest {
    /// Form fields, when the request goes out as multipart/form-data
    ///
    /// An empty `multipartFields` block does not count.
    pub fn form_fields(&self) -> Option<&Map<String, Value>> {
        self.multipart_fields
            .as_ref()
            .filter(|fields| !fields.is_empty())
    }

    /// Whether the response body has to be decoded at all
    pub fn inspects_body(&self) -> bool {
        self.expected_response.is_some() || self.response_variables.is_some()
    }
}

impl TestScenario {
    /// Load a scenario from disk, choosing the decoder by file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::scenario_load(path, e))?;

        let scenario = if is_json_file(path) {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        };
        scenario.map_err(|e| match e {
            Error::ScenarioLoad { reason, .. } => Error::scenario_load(path, reason),
            other => other,
        })
    }

    /// Parse a scenario from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ScenarioLoad {
            path: "<yaml>".to_string(),
            reason: format!("error decoding the YAML test scenario: {}", e),
        })
    }

    /// Parse a scenario from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::ScenarioLoad {
            path: "<json>".to_string(),
            reason: format!("error decoding the JSON test scenario: {}", e),
        })
    }

    /// Display name for the scenario, falling back to the file stem
    pub fn display_name(&self, path: &Path) -> String {
        self.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scenario".to_string())
        })
    }
}
