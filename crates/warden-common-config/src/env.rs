// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Reading secrets and settings from the process environment.
//!
//! Secrets follow the `VAR` / `VAR_FILE` convention: when `VAR_FILE` is set the
//! secret is read from that path (Docker and Kubernetes secret mounts), which
//! takes precedence over a literal `VAR`.

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, fs};

use thiserror::Error;
use warden_common_secret::SecretString;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

#[derive(Debug, Error)]
#[error("invalid value for {var}: {message}")]
pub struct EnvParseError {
	pub var: String,
	pub message: String,
}

/// Load `var` from `{var}_FILE` or `{var}`, in that order.
///
/// A single trailing newline is stripped from file contents. Returns `Ok(None)`
/// when neither variable is set.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path) = env::var(&file_var) {
		if path.is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}
		let path = PathBuf::from(path);
		let mut contents = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;
		if contents.ends_with('\n') {
			contents.pop();
		}
		return Ok(Some(SecretString::new(contents)));
	}

	Ok(env::var(var).ok().map(SecretString::new))
}

/// Like [`load_secret_env`] but a missing secret is an error.
pub fn require_secret_env(var: &str) -> Result<SecretString, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

/// Non-empty string value of `var`, if set.
pub fn env_string(var: &str) -> Option<String> {
	env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Parse `var` into `T`. Unset or blank is `Ok(None)`; unparsable is an error.
pub fn env_parse<T>(var: &str) -> Result<Option<T>, EnvParseError>
where
	T: FromStr,
	T::Err: std::fmt::Display,
{
	match env_string(var) {
		None => Ok(None),
		Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| EnvParseError {
			var: var.to_string(),
			message: e.to_string(),
		}),
	}
}
