// crates/cargowhale-config/src/config.rs
// ============================================================================
// Module: CargoWhale Configuration
// Description: Configuration loading and validation for CargoWhale.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: cargowhale-client, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is located by explicit path, then the `CARGOWHALE_CONFIG`
//! environment variable, then `cargowhale.toml` in the working directory.
//! Every section has defaults, so an empty file is valid.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use cargowhale_client::EndpointResolver;
use cargowhale_client::EndpointRoutes;
use cargowhale_client::ReqwestTransport;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "cargowhale.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CARGOWHALE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default upstream endpoint.
pub(crate) const DEFAULT_DOCKER_ENDPOINT: &str = "http://localhost:2375/containers/";
/// Default upstream request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Minimum upstream request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum upstream request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default maximum upstream response size in bytes.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Minimum allowed upstream response limit in bytes.
pub(crate) const MIN_MAX_RESPONSE_BYTES: usize = 1024;
/// Maximum allowed upstream response limit in bytes.
pub(crate) const MAX_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default metrics summary period in milliseconds.
pub(crate) const DEFAULT_METRICS_PERIOD_MS: u64 = 60_000;
/// Minimum metrics summary period in milliseconds.
pub(crate) const MIN_METRICS_PERIOD_MS: u64 = 1_000;
/// Maximum metrics summary period in milliseconds.
pub(crate) const MAX_METRICS_PERIOD_MS: u64 = 86_400_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// CargoWhale configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CargoWhaleConfig {
    /// Upstream container runtime settings.
    #[serde(default)]
    pub docker: DockerConfig,
    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Contract document settings.
    #[serde(default)]
    pub contract: ContractConfig,
}

impl CargoWhaleConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.docker.validate()?;
        self.metrics.validate()?;
        self.contract.validate()?;
        Ok(())
    }
}

/// Upstream container runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerConfig {
    /// Absolute base URL every route is appended to.
    #[serde(default = "default_docker_endpoint")]
    pub endpoint: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum accepted response size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Route templates relative to `endpoint`.
    #[serde(default)]
    pub routes: EndpointRoutes,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_docker_endpoint(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            routes: EndpointRoutes::default(),
        }
    }
}

impl DockerConfig {
    /// Validates the upstream settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.endpoint.ends_with('/') {
            return Err(ConfigError::Invalid("docker.endpoint must end with '/'".to_string()));
        }
        self.resolver()?;
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "docker.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if !(MIN_MAX_RESPONSE_BYTES ..= MAX_MAX_RESPONSE_BYTES).contains(&self.max_response_bytes) {
            return Err(ConfigError::Invalid(format!(
                "docker.max_response_bytes must be between {MIN_MAX_RESPONSE_BYTES} and \
                 {MAX_MAX_RESPONSE_BYTES}"
            )));
        }
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Builds the endpoint resolver for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the endpoint or a route is
    /// rejected.
    pub fn resolver(&self) -> Result<EndpointResolver, ConfigError> {
        EndpointResolver::new(&self.endpoint)
            .and_then(|resolver| resolver.with_routes(self.routes.clone()))
            .map_err(|err| ConfigError::Invalid(format!("docker: {err}")))
    }

    /// Builds the blocking HTTP transport for these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the HTTP client cannot be built.
    pub fn transport(&self) -> Result<ReqwestTransport, ConfigError> {
        ReqwestTransport::new(self.timeout(), self.max_response_bytes)
            .map_err(|err| ConfigError::Invalid(format!("docker: {err}")))
    }
}

/// Metrics settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// JSON-lines metrics log settings.
    #[serde(default)]
    pub logs: MetricsLogsConfig,
}

impl MetricsConfig {
    /// Validates the metrics settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logs.validate()
    }
}

/// Periodic metrics summary log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsLogsConfig {
    /// Whether summary records are written.
    #[serde(default)]
    pub enabled: bool,
    /// Minimum time between summary records in milliseconds.
    #[serde(default = "default_metrics_period_ms")]
    pub period_ms: u64,
}

impl Default for MetricsLogsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: DEFAULT_METRICS_PERIOD_MS,
        }
    }
}

impl MetricsLogsConfig {
    /// Validates the summary period.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the period is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_METRICS_PERIOD_MS ..= MAX_METRICS_PERIOD_MS).contains(&self.period_ms) {
            return Err(ConfigError::Invalid(format!(
                "metrics.logs.period_ms must be between {MIN_METRICS_PERIOD_MS} and \
                 {MAX_METRICS_PERIOD_MS}"
            )));
        }
        Ok(())
    }

    /// Returns the summary period when summaries are enabled.
    #[must_use]
    pub const fn summary_period(&self) -> Option<Duration> {
        if self.enabled { Some(Duration::from_millis(self.period_ms)) } else { None }
    }
}

/// Contract document settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractConfig {
    /// Path of the contract document (`.json`, `.yaml`, `.yml`).
    #[serde(default)]
    pub path: Option<String>,
}

impl ContractConfig {
    /// Validates the contract path when present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the path is empty or too long.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            validate_path_string("contract.path", path)?;
        }
        Ok(())
    }
}

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default upstream endpoint.
fn default_docker_endpoint() -> String {
    DEFAULT_DOCKER_ENDPOINT.to_string()
}

/// Default request timeout in milliseconds.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default maximum response size in bytes.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Default metrics summary period in milliseconds.
const fn default_metrics_period_ms() -> u64 {
    DEFAULT_METRICS_PERIOD_MS
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}
