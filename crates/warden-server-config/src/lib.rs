// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the warden security layer.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults (`ai` 30/60s, `upload` 10/60s, sweep every 60s)
//! 2. TOML file named by `WARDEN_CONFIG`, if set
//! 3. Environment variables (`WARDEN_LOG_LEVEL`, `WARDEN_LOG_FORMAT`,
//!    `APP_ENV`, `WARDEN_RATE_LIMIT_SWEEP_SECS`)
//!
//! The encryption master key is deliberately absent: it is read from
//! `ENCRYPTION_KEY` / `ENCRYPTION_KEY_FILE` by the secrets crate and never
//! sits in a config file.

pub mod error;
pub mod layer;
pub mod sections;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, instrument};

pub use error::{ConfigError, ConfigResult};
pub use layer::SecurityConfigLayer;
pub use sections::{
	LogFormat, LoggingConfig, LoggingConfigLayer, RateLimitSettings, RateLimitSettingsLayer,
	RateLimitsConfig, RateLimitsConfigLayer, RuntimeMode, AI_LIMIT, MAX_WINDOW_SECS,
	UPLOAD_LIMIT,
};

/// Environment variable naming the optional TOML config file.
pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG";

/// Fully resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityConfig {
	pub logging: LoggingConfig,
	pub rate_limits: RateLimitsConfig,
}

/// Load defaults, the `WARDEN_CONFIG` file if present, then the environment.
pub fn load_config() -> ConfigResult<SecurityConfig> {
	let path = warden_common_config::env_string(CONFIG_PATH_ENV);
	load_config_from(path.as_deref().map(Path::new))
}

/// Like [`load_config`] with an explicit file path.
#[instrument(skip_all, fields(path = ?path))]
pub fn load_config_from(path: Option<&Path>) -> ConfigResult<SecurityConfig> {
	let mut layer = SecurityConfigLayer::default();
	if let Some(path) = path {
		layer.merge(load_file_layer(path)?);
	}
	layer.merge(SecurityConfigLayer::from_env()?);

	let config = layer.finalize()?;
	debug!(
		mode = %config.logging.mode,
		limits = config.rate_limits.limits.len(),
		"Loaded security configuration"
	);
	Ok(config)
}

/// Parse a single TOML file into a layer.
pub fn load_file_layer(path: &Path) -> ConfigResult<SecurityConfigLayer> {
	let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
		path: path.to_path_buf(),
		source,
	})?;
	toml::from_str(&contents).map_err(|source| ConfigError::TomlParse {
		path: path.to_path_buf(),
		source,
	})
}
