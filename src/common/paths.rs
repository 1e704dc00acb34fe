//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/endpoint-tester/`
//! - macOS: `~/Library/Application Support/endpoint-tester/`
//! - Windows: `%APPDATA%\endpoint-tester\`

use std::path::{Path, PathBuf};

/// Application name used for the config directory
const APP_NAME: &str = "endpoint-tester";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Whether a scenario file should be decoded as JSON rather than YAML
pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
