//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Response verification settings
    #[serde(default)]
    pub verify: VerifyConfig,

    /// Scenario execution settings
    #[serde(default)]
    pub run: RunConfig,
}

/// How an expected response is compared against the actual body
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Only keys listed in the expectation are checked
    #[default]
    Superset,
    /// The actual body may not carry keys beyond the expectation
    Exact,
}

/// HTTP transport settings
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header sent unless a scenario overrides it
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("endpoint-tester/{}", env!("CARGO_PKG_VERSION"))
}

/// Response verification settings
#[derive(Debug, Deserialize, Default)]
pub struct VerifyConfig {
    #[serde(default)]
    pub match_mode: MatchPolicy,
}

/// Scenario execution settings
#[derive(Debug, Deserialize, Default)]
pub struct RunConfig {
    /// Abort the scenario at the first failing endpoint
    #[serde(default)]
    pub stop_on_failure: bool,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::Error::Config(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }
}
