// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Environment helpers shared by the warden crates.

pub mod env;

pub use env::{
	env_parse, env_string, load_secret_env, require_secret_env, EnvParseError, RequiredSecretError,
	SecretEnvError,
};
pub use warden_common_secret::{Secret, SecretString};
