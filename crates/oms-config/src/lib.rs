//! Configuration management for the order service.
//!
//! Configuration is read from a TOML file. Values support environment
//! variable references in `${VAR}` and `${VAR:-default}` form, resolved
//! before parsing. Every section carries defaults so a minimal deployment
//! can start from an empty file.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// IO error when reading the configuration file.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error parsing the configuration content.
	#[error("Parse error: {0}")]
	Parse(String),
	/// Configuration failed validation.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// API server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address the HTTP server binds to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port the HTTP server listens on.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Name of the backend to use. Must be present in `implementations`.
	#[serde(default = "default_storage_primary")]
	pub primary: String,
	/// Backend-specific configuration tables, keyed by backend name.
	#[serde(default = "default_storage_implementations")]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			primary: default_storage_primary(),
			implementations: default_storage_implementations(),
		}
	}
}

/// Expiry sweep configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
	/// Seconds between sweep runs.
	#[serde(default = "default_sweep_interval_seconds")]
	pub interval_seconds: u64,
	/// Age in hours after which a pending order is considered expired.
	#[serde(default = "default_sweep_expiry_hours")]
	pub expiry_hours: u64,
}

impl Default for SweepConfig {
	fn default() -> Self {
		Self {
			interval_seconds: default_sweep_interval_seconds(),
			expiry_hours: default_sweep_expiry_hours(),
		}
	}
}

/// Main configuration structure for the order service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// API server configuration.
	#[serde(default)]
	pub api: ApiConfig,
	/// Storage configuration.
	#[serde(default)]
	pub storage: StorageConfig,
	/// Expiry sweep configuration.
	#[serde(default)]
	pub sweep: SweepConfig,
}

/// Default API host address.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Default API port.
fn default_api_port() -> u16 {
	8080
}

/// Default storage backend name.
fn default_storage_primary() -> String {
	"memory".to_string()
}

/// Default storage implementations table. The memory backend needs no
/// configuration of its own.
fn default_storage_implementations() -> HashMap<String, toml::Value> {
	HashMap::from([("memory".to_string(), toml::Value::Table(toml::Table::new()))])
}

/// Default interval between sweep runs, in seconds.
fn default_sweep_interval_seconds() -> u64 {
	3600
}

/// Default age threshold for expiring pending orders, in hours.
fn default_sweep_expiry_hours() -> u64 {
	24
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = tokio::fs::read_to_string(path).await?;
		contents.parse()
	}

	/// Validates the configuration for consistency.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.api.host.is_empty() {
			return Err(ConfigError::Validation(
				"API host cannot be empty".to_string(),
			));
		}
		if self.api.port == 0 {
			return Err(ConfigError::Validation(
				"API port cannot be 0".to_string(),
			));
		}
		if self.storage.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Primary storage backend cannot be empty".to_string(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}
		if self.sweep.interval_seconds == 0 {
			return Err(ConfigError::Validation(
				"Sweep interval must be greater than 0 seconds".to_string(),
			));
		}
		if self.sweep.interval_seconds > 86400 {
			return Err(ConfigError::Validation(
				"Sweep interval cannot exceed 86400 seconds (24 hours)".to_string(),
			));
		}
		if self.sweep.expiry_hours == 0 {
			return Err(ConfigError::Validation(
				"Expiry threshold must be greater than 0 hours".to_string(),
			));
		}
		if self.sweep.expiry_hours > 8760 {
			return Err(ConfigError::Validation(
				"Expiry threshold cannot exceed 8760 hours (1 year)".to_string(),
			));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Resolves `${VAR}` and `${VAR:-default}` references against the process
/// environment.
///
/// Fails when a referenced variable is unset and no default is given, so a
/// misconfigured deployment stops at startup instead of running with a
/// half-substituted configuration.
fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Bounds on input size and on variable/default lengths keep the regex
	// from chewing on pathological inputs.
	const MAX_INPUT_SIZE: usize = 1_048_576;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Parse(format!(
			"Configuration too large: {} bytes exceeds maximum of {} bytes",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Invalid environment variable pattern: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last_end = 0;
	for caps in re.captures_iter(input) {
		let Some(whole) = caps.get(0) else { continue };
		let Some(name) = caps.get(1) else { continue };

		let value = match std::env::var(name.as_str()) {
			Ok(value) => value,
			Err(_) => match caps.get(2) {
				Some(default) => default.as_str().to_string(),
				None => {
					return Err(ConfigError::Parse(format!(
						"Environment variable '{}' not found and no default provided",
						name.as_str()
					)));
				},
			},
		};

		result.push_str(&input[last_end..whole.start()]);
		result.push_str(&value);
		last_end = whole.end();
	}
	result.push_str(&input[last_end..]);
	Ok(result)
}
