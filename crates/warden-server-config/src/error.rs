// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

use warden_common_config::EnvParseError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse TOML config at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error(transparent)]
	Env(#[from] EnvParseError),

	#[error("Validation error: {0}")]
	Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
