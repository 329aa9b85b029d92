//! Configuration file loading with precedence handling.

use crate::model::{Mode, OperationRequest, Scope};
use crate::section::{SectionResolver, DEFAULT_HEADING_MARKER};
use crate::state::EngineOptions;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CALLOUT_SYNC_CONFIG";

/// Environment variable overriding the heading marker.
pub const HEADING_MARKER_ENV_VAR: &str = "CALLOUT_SYNC_HEADING_MARKER";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read an existing config file.
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file is not valid TOML or has unexpected keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// Every key is optional; missing keys fall back to [`ResolvedConfig`]
/// defaults. Lives at `~/.config/callout-sync/config.toml` by default.
///
/// ```toml
/// heading_marker = "#"
/// write_text = true
/// tag_positions = true
/// default_scope = "all"
/// default_mode = "toggle"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Single character marking heading lines.
    #[serde(default)]
    pub heading_marker: Option<char>,

    /// Persist new states into header lines.
    #[serde(default)]
    pub write_text: Option<bool>,

    /// Tag rendered elements with their source line range.
    #[serde(default)]
    pub tag_positions: Option<bool>,

    /// Scope used when the CLI does not name one.
    #[serde(default)]
    pub default_scope: Option<Scope>,

    /// Mode used when the CLI does not name one.
    #[serde(default)]
    pub default_mode: Option<Mode>,

    /// Path to the tracing log file.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Heading marker for section resolution.
    pub heading_marker: char,
    /// Persist new states into header lines.
    pub write_text: bool,
    /// Tag rendered elements with their source line range.
    pub tag_positions: bool,
    /// Scope applied by default.
    pub default_scope: Scope,
    /// Mode applied by default.
    pub default_mode: Mode,
    /// Path to the tracing log file.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            heading_marker: DEFAULT_HEADING_MARKER,
            write_text: true,
            tag_positions: true,
            default_scope: Scope::All,
            default_mode: Mode::Toggle,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Operation handler options derived from these settings.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            resolver: SectionResolver::new(self.heading_marker),
            tag_positions: self.tag_positions,
        }
    }

    /// Request for the configured default scope and mode.
    pub fn default_request(&self) -> OperationRequest {
        OperationRequest::new(self.default_scope, self.default_mode)
            .with_write_text(self.write_text)
    }
}

/// Default log file path.
///
/// `~/.local/state/callout-sync/callout-sync.log` on Linux; the current
/// directory when no state directory exists on the platform.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("callout-sync").join("callout-sync.log"),
        None => PathBuf::from("callout-sync.log"),
    }
}

/// Load a config file.
///
/// A missing file is `Ok(None)`, not an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Default config file path, `None` when the platform has no config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("callout-sync").join("config.toml"))
}

/// Load the config file that wins the path precedence:
///
/// 1. explicit `config_path` (CLI `--config`)
/// 2. `CALLOUT_SYNC_CONFIG`
/// 3. [`default_config_path`]
///
/// # Errors
///
/// Returns an error only if the selected file exists but is unreadable or
/// invalid.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV_VAR} is empty")));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Fold the config file over the defaults.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        heading_marker: config.heading_marker.unwrap_or(defaults.heading_marker),
        write_text: config.write_text.unwrap_or(defaults.write_text),
        tag_positions: config.tag_positions.unwrap_or(defaults.tag_positions),
        default_scope: config.default_scope.unwrap_or(defaults.default_scope),
        default_mode: config.default_mode.unwrap_or(defaults.default_mode),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply `CALLOUT_SYNC_HEADING_MARKER`.
///
/// Values that are not exactly one character are ignored with a warning.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(value) = std::env::var(HEADING_MARKER_ENV_VAR) {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(marker), None) => config.heading_marker = marker,
            _ => warn!(
                value = %value,
                "{HEADING_MARKER_ENV_VAR} must be a single character; ignoring"
            ),
        }
    }

    config
}

/// Apply CLI flags, the highest-precedence layer. `None` leaves the
/// setting as resolved so far.
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    scope_override: Option<Scope>,
    mode_override: Option<Mode>,
) -> ResolvedConfig {
    if let Some(scope) = scope_override {
        config.default_scope = scope;
    }

    if let Some(mode) = mode_override {
        config.default_mode = mode;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
