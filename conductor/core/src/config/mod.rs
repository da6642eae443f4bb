//! TOML Configuration File Support
//!
//! This module provides centralized configuration loading for Course Buddy,
//! supporting a TOML configuration file at
//! `~/.config/course-buddy/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (when applicable)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/course-buddy/config.toml` (typically
//!   `~/.config/course-buddy/config.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:8000"
//! search_path = "/api/search"
//! suggestions_path = "/api/suggestions"
//! timeout_secs = 30
//!
//! [pacing]
//! min_ms = 1000
//! max_ms = 4000
//! per_char_ms = 20
//! transport_grace_ms = 1000
//!
//! [welcome]
//! compose_ms = 1000
//! pause_ms = 600
//! follow_up_ms = 1200
//!
//! [limits]
//! max_query_chars = 500
//! queries_per_minute = 30
//!
//! [replies]
//! greeting = "Hi! Ask me about courses."
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::ServiceConfig;
use crate::conductor::ConductorConfig;
use crate::replies::ReplyCopy;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Course service section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToml {
    /// Scheme, host and port of the course service
    pub base_url: Option<String>,

    /// Search endpoint path
    pub search_path: Option<String>,

    /// Suggestions endpoint path
    pub suggestions_path: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Pacing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingToml {
    /// Floor of the perceived reply latency
    pub min_ms: Option<u64>,

    /// Ceiling of the perceived reply latency
    pub max_ms: Option<u64>,

    /// Latency added per reply character
    pub per_char_ms: Option<u64>,

    /// Wait before a transport failure is reported
    pub transport_grace_ms: Option<u64>,
}

/// Welcome sequence section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WelcomeToml {
    /// Composing time before the greeting
    pub compose_ms: Option<u64>,

    /// Pause between the two welcome messages
    pub pause_ms: Option<u64>,

    /// Composing time before the capabilities message
    pub follow_up_ms: Option<u64>,
}

/// Input limits section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsToml {
    /// Maximum query length in characters
    pub max_query_chars: Option<usize>,

    /// Maximum queries per minute
    pub queries_per_minute: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuddyToml {
    /// Course service section
    pub service: ServiceToml,

    /// Pacing section
    pub pacing: PacingToml,

    /// Welcome sequence section
    pub welcome: WelcomeToml,

    /// Input limits section
    pub limits: LimitsToml,

    /// Reply copy; unset keys keep their defaults
    pub replies: Option<ReplyCopy>,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for Course Buddy
///
/// This struct consolidates all configuration from multiple sources and tracks
/// where the values came from. Use [`load_config`] to load configuration with
/// proper priority handling.
#[derive(Clone, Debug, Default)]
pub struct BuddyConfigFile {
    /// Course service endpoints
    pub service: ServiceConfig,

    /// Conductor behaviour
    pub conductor: ConductorConfig,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::Default
    }
}

impl BuddyConfigFile {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Reject combinations the Conductor cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "service base_url must not be empty".to_string(),
            ));
        }
        let pacing = &self.conductor.pacing;
        if pacing.min > pacing.max {
            return Err(ConfigError::ValidationError(format!(
                "pacing min ({}ms) exceeds max ({}ms)",
                pacing.min.as_millis(),
                pacing.max.as_millis()
            )));
        }
        if self.conductor.limits.max_query_chars == 0 {
            return Err(ConfigError::ValidationError(
                "max_query_chars must be at least 1".to_string(),
            ));
        }
        if self.conductor.limits.queries_per_minute == 0 {
            return Err(ConfigError::ValidationError(
                "queries_per_minute must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/course-buddy/config.toml` or
/// `~/.config/course-buddy/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("course-buddy").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// Priority order (highest first):
/// 1. CLI arguments (not handled here - caller should apply after)
/// 2. Environment variables
/// 3. TOML configuration file
/// 4. Default values
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<BuddyConfigFile, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<BuddyConfigFile, ConfigError> {
    load_with_env(path, |key| std::env::var(key).ok())
}

fn load_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<BuddyConfigFile, ConfigError> {
    // Start with defaults
    let mut config = BuddyConfigFile::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: BuddyToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut BuddyConfigFile, toml: BuddyToml) {
    // Service settings
    if let Some(url) = toml.service.base_url {
        config.service.base_url = url;
    }
    if let Some(path) = toml.service.search_path {
        config.service.search_path = path;
    }
    if let Some(path) = toml.service.suggestions_path {
        config.service.suggestions_path = path;
    }
    if let Some(secs) = toml.service.timeout_secs {
        config.service.timeout = Duration::from_secs(secs);
    }

    // Pacing settings
    let pacing = &mut config.conductor.pacing;
    if let Some(ms) = toml.pacing.min_ms {
        pacing.min = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.max_ms {
        pacing.max = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.per_char_ms {
        pacing.per_char = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.pacing.transport_grace_ms {
        pacing.transport_grace = Duration::from_millis(ms);
    }

    // Welcome settings
    let welcome = &mut config.conductor.welcome;
    if let Some(ms) = toml.welcome.compose_ms {
        welcome.compose = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.welcome.pause_ms {
        welcome.pause = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.welcome.follow_up_ms {
        welcome.follow_up = Duration::from_millis(ms);
    }

    // Limits
    if let Some(chars) = toml.limits.max_query_chars {
        config.conductor.limits.max_query_chars = chars;
    }
    if let Some(rate) = toml.limits.queries_per_minute {
        config.conductor.limits.queries_per_minute = rate;
    }

    if let Some(replies) = toml.replies {
        config.conductor.replies = replies;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut BuddyConfigFile, env: impl Fn(&str) -> Option<String>) {
    let parsed = |key: &str| env(key).and_then(|v| v.parse::<u64>().ok());

    // Service settings from environment
    if let Some(url) = env("BUDDY_API_URL") {
        config.service.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = env("BUDDY_SEARCH_PATH") {
        config.service.search_path = path;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = env("BUDDY_SUGGESTIONS_PATH") {
        config.service.suggestions_path = path;
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = parsed("BUDDY_REQUEST_TIMEOUT_SECS") {
        config.service.timeout = Duration::from_secs(secs);
        config.source = ConfigSource::Env;
    }

    // Limits from environment
    if let Some(chars) = env("BUDDY_MAX_QUERY_CHARS").and_then(|v| v.parse::<usize>().ok()) {
        config.conductor.limits.max_query_chars = chars;
        config.source = ConfigSource::Env;
    }
    if let Some(rate) = env("BUDDY_QUERIES_PER_MINUTE").and_then(|v| v.parse::<u32>().ok()) {
        config.conductor.limits.queries_per_minute = rate;
        config.source = ConfigSource::Env;
    }

    // Pacing from environment
    if let Some(ms) = parsed("BUDDY_PACING_MIN_MS") {
        config.conductor.pacing.min = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parsed("BUDDY_PACING_MAX_MS") {
        config.conductor.pacing.max = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parsed("BUDDY_PACING_PER_CHAR_MS") {
        config.conductor.pacing.per_char = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Course service URL override
    pub api_url: Option<String>,

    /// Request timeout override (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Max query length override
    pub max_query_chars: Option<usize>,

    /// Queries per minute override
    pub queries_per_minute: Option<u32>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set course service URL override
    #[must_use]
    pub fn with_api_url(mut self, url: String) -> Self {
        self.api_url = Some(url);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Set max query length override
    #[must_use]
    pub fn with_max_query_chars(mut self, chars: usize) -> Self {
        self.max_query_chars = Some(chars);
        self
    }

    /// Set queries per minute override
    #[must_use]
    pub fn with_queries_per_minute(mut self, rate: u32) -> Self {
        self.queries_per_minute = Some(rate);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the result is unusable.
    pub fn apply(&self, config: &mut BuddyConfigFile) -> Result<(), ConfigError> {
        if self.api_url.is_some()
            || self.request_timeout_secs.is_some()
            || self.max_query_chars.is_some()
            || self.queries_per_minute.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.api_url {
            config.service.base_url = url.clone();
        }

        if let Some(secs) = self.request_timeout_secs {
            config.service.timeout = Duration::from_secs(secs);
        }

        if let Some(chars) = self.max_query_chars {
            config.conductor.limits.max_query_chars = chars;
        }

        if let Some(rate) = self.queries_per_minute {
            config.conductor.limits.queries_per_minute = rate;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = BuddyConfigFile::default();

        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.service.search_path, "/api/search");
        assert_eq!(config.service.timeout, Duration::from_secs(30));
        assert_eq!(config.conductor.pacing.min, Duration::from_millis(1000));
        assert_eq!(config.conductor.pacing.max, Duration::from_millis(4000));
        assert_eq!(config.conductor.limits.max_query_chars, 500);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("course-buddy"));
            assert!(p.to_string_lossy().ends_with("config.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[service]
base_url = "http://courses.internal:9000"
suggestions_path = "/v2/suggestions"
timeout_secs = 5

[pacing]
min_ms = 500
max_ms = 2000
per_char_ms = 10

[welcome]
pause_ms = 300

[limits]
max_query_chars = 200
queries_per_minute = 10

[replies]
greeting = "Welcome back!"
"#,
        );

        let config = load_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.service.base_url, "http://courses.internal:9000");
        assert_eq!(config.service.search_path, "/api/search");
        assert_eq!(config.service.suggestions_path, "/v2/suggestions");
        assert_eq!(config.service.timeout, Duration::from_secs(5));

        assert_eq!(config.conductor.pacing.min, Duration::from_millis(500));
        assert_eq!(config.conductor.pacing.max, Duration::from_millis(2000));
        assert_eq!(config.conductor.pacing.per_char, Duration::from_millis(10));

        assert_eq!(config.conductor.welcome.pause, Duration::from_millis(300));
        assert_eq!(config.conductor.welcome.compose, Duration::from_millis(1000));

        assert_eq!(config.conductor.limits.max_query_chars, 200);
        assert_eq!(config.conductor.limits.queries_per_minute, 10);

        assert_eq!(config.conductor.replies.greeting, "Welcome back!");
        assert_eq!(
            config.conductor.replies.empty_query,
            ReplyCopy::default().empty_query
        );

        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_empty_toml() {
        let file = write_toml("");
        let config = load_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.service, ServiceConfig::default());
        assert_eq!(config.conductor, ConductorConfig::default());
        assert_eq!(config.source(), ConfigSource::File);
    }

    // =========================================================================
    // Missing File Handling Tests
    // =========================================================================

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let config = load_with_env(Some(path), no_env).unwrap();

        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let config = load_with_env(None, no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Malformed and Invalid Configuration Tests
    // =========================================================================

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml(
            r#"
[service
timeout_secs = "not a number"
"#,
        );

        let result = load_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_pacing_min_above_max_rejected() {
        let file = write_toml(
            r#"
[pacing]
min_ms = 5000
max_ms = 1000
"#,
        );

        let err = load_with_env(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(ref m) if m.contains("pacing")));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let env: HashMap<&str, &str> = HashMap::from([("BUDDY_API_URL", "  ")]);
        let err = load_with_env(None, |k| env.get(k).map(|v| (*v).to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml(
            r#"
[service]
base_url = "http://file-host:8000"

[pacing]
per_char_ms = 30
"#,
        );
        let env: HashMap<&str, &str> = HashMap::from([
            ("BUDDY_API_URL", "http://env-host:8000"),
            ("BUDDY_PACING_MAX_MS", "3000"),
            ("BUDDY_QUERIES_PER_MINUTE", "not-a-number"),
        ]);

        let config = load_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.service.base_url, "http://env-host:8000");
        assert_eq!(config.conductor.pacing.max, Duration::from_millis(3000));
        assert_eq!(config.conductor.pacing.per_char, Duration::from_millis(30));
        // Unparseable values are ignored
        assert_eq!(config.conductor.limits.queries_per_minute, 30);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_layer_reads_every_variable() {
        let file = write_toml(
            r#"
[welcome]
pause_ms = 300

[pacing]
transport_grace_ms = 900
"#,
        );
        let env: HashMap<&str, &str> = HashMap::from([
            ("BUDDY_SEARCH_PATH", "/v2/search"),
            ("BUDDY_SUGGESTIONS_PATH", "/v2/suggestions"),
            ("BUDDY_REQUEST_TIMEOUT_SECS", "7"),
            ("BUDDY_MAX_QUERY_CHARS", "120"),
            ("BUDDY_QUERIES_PER_MINUTE", "12"),
            ("BUDDY_PACING_MIN_MS", "200"),
            ("BUDDY_PACING_PER_CHAR_MS", "5"),
        ]);

        let config = load_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.service.search_path, "/v2/search");
        assert_eq!(config.service.suggestions_path, "/v2/suggestions");
        assert_eq!(config.service.timeout, Duration::from_secs(7));
        assert_eq!(config.conductor.limits.max_query_chars, 120);
        assert_eq!(config.conductor.limits.queries_per_minute, 12);
        assert_eq!(config.conductor.pacing.min, Duration::from_millis(200));
        assert_eq!(config.conductor.pacing.per_char, Duration::from_millis(5));
        // File-only sections survive the env layer
        assert_eq!(config.conductor.welcome.pause, Duration::from_millis(300));
        assert_eq!(
            config.conductor.pacing.transport_grace,
            Duration::from_millis(900)
        );
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = BuddyConfigFile::default();
        config.service.base_url = "http://env-host:8000".to_string();
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_api_url("http://cli-host:8000".to_string())
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.service.base_url, "http://cli-host:8000");
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    // =========================================================================
    // ConfigOverrides Tests
    // =========================================================================

    #[test]
    fn test_config_overrides_builder() {
        let overrides = ConfigOverrides::new()
            .with_api_url("http://example.com".to_string())
            .with_request_timeout_secs(3)
            .with_max_query_chars(120)
            .with_queries_per_minute(5);

        assert_eq!(overrides.api_url.as_deref(), Some("http://example.com"));
        assert_eq!(overrides.request_timeout_secs, Some(3));
        assert_eq!(overrides.max_query_chars, Some(120));
        assert_eq!(overrides.queries_per_minute, Some(5));
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = BuddyConfigFile::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_config_overrides_validated() {
        let mut config = BuddyConfigFile::default();
        let result = ConfigOverrides::new()
            .with_queries_per_minute(0)
            .apply(&mut config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    // =========================================================================
    // ConfigSource Tests
    // =========================================================================

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI");
        assert_eq!(format!("{}", ConfigSource::Env), "environment");
        assert_eq!(format!("{}", ConfigSource::File), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    // =========================================================================
    // TOML Serialization Tests
    // =========================================================================

    #[test]
    fn test_toml_round_trip() {
        let original = BuddyToml {
            service: ServiceToml {
                base_url: Some("http://round.trip".to_string()),
                timeout_secs: Some(12),
                ..Default::default()
            },
            pacing: PacingToml {
                min_ms: Some(250),
                ..Default::default()
            },
            ..Default::default()
        };

        let toml_string = toml::to_string(&original).unwrap();
        let parsed: BuddyToml = toml::from_str(&toml_string).unwrap();

        assert_eq!(parsed.service.base_url.as_deref(), Some("http://round.trip"));
        assert_eq!(parsed.service.timeout_secs, Some(12));
        assert_eq!(parsed.pacing.min_ms, Some(250));
        assert!(parsed.replies.is_none());
    }

    // =========================================================================
    // Error Type Tests
    // =========================================================================

    #[test]
    fn test_config_error_display() {
        let read_err = ConfigError::ReadError {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{}", read_err);
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("Failed to read"));

        let validation_err = ConfigError::ValidationError("invalid value".to_string());
        assert!(format!("{}", validation_err).contains("invalid value"));
    }
}
