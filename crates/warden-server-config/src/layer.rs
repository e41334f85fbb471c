// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;
use warden_common_config::{env_parse, env_string};

use crate::error::ConfigResult;
use crate::sections::{LogFormat, LoggingConfigLayer, RateLimitsConfigLayer, RuntimeMode};
use crate::SecurityConfig;

/// Every field optional so file and environment layers can be merged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfigLayer {
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub rate_limits: Option<RateLimitsConfigLayer>,
}

impl SecurityConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: SecurityConfigLayer) {
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_option(
			&mut self.rate_limits,
			other.rate_limits,
			RateLimitsConfigLayer::merge,
		);
	}

	/// Layer built from `WARDEN_LOG_LEVEL`, `WARDEN_LOG_FORMAT`, `APP_ENV` and
	/// `WARDEN_RATE_LIMIT_SWEEP_SECS`.
	pub fn from_env() -> ConfigResult<Self> {
		let logging = LoggingConfigLayer {
			level: env_string("WARDEN_LOG_LEVEL"),
			format: env_parse::<LogFormat>("WARDEN_LOG_FORMAT")?,
			mode: env_string("APP_ENV").map(|v| RuntimeMode::from_app_env(&v)),
		};
		let rate_limits = RateLimitsConfigLayer {
			sweep_interval_secs: env_parse("WARDEN_RATE_LIMIT_SWEEP_SECS")?,
			..Default::default()
		};

		Ok(Self {
			logging: Some(logging),
			rate_limits: Some(rate_limits),
		})
	}

	pub fn finalize(self) -> ConfigResult<SecurityConfig> {
		Ok(SecurityConfig {
			logging: self.logging.unwrap_or_default().finalize(),
			rate_limits: self.rate_limits.unwrap_or_default().finalize()?,
		})
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}
