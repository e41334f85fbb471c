// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Named rate limit presets and the expiry sweep interval.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Preset name for AI completion calls.
pub const AI_LIMIT: &str = "ai";

/// Preset name for file uploads.
pub const UPLOAD_LIMIT: &str = "upload";

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Longest accepted window: 366 days.
pub const MAX_WINDOW_SECS: u64 = 366 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateLimitSettingsLayer {
	pub max_requests: Option<u32>,
	pub window_secs: Option<u64>,
}

impl RateLimitSettingsLayer {
	pub fn merge(&mut self, other: Self) {
		if other.max_requests.is_some() {
			self.max_requests = other.max_requests;
		}
		if other.window_secs.is_some() {
			self.window_secs = other.window_secs;
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateLimitsConfigLayer {
	pub sweep_interval_secs: Option<u64>,
	#[serde(default)]
	pub limits: BTreeMap<String, RateLimitSettingsLayer>,
}

impl RateLimitsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.sweep_interval_secs.is_some() {
			self.sweep_interval_secs = other.sweep_interval_secs;
		}
		for (name, layer) in other.limits {
			self.limits.entry(name).or_default().merge(layer);
		}
	}

	/// Apply defaults for the built-in presets and validate every entry.
	pub fn finalize(self) -> ConfigResult<RateLimitsConfig> {
		let mut limits = default_limits();
		for (name, layer) in self.limits {
			let base = limits.get(&name).copied();
			let settings = RateLimitSettings {
				max_requests: layer
					.max_requests
					.or(base.map(|b| b.max_requests))
					.ok_or_else(|| missing(&name, "max_requests"))?,
				window_secs: layer
					.window_secs
					.or(base.map(|b| b.window_secs))
					.ok_or_else(|| missing(&name, "window_secs"))?,
			};
			limits.insert(name, settings);
		}

		for (name, settings) in &limits {
			if settings.max_requests == 0 {
				return Err(ConfigError::Validation(format!(
					"rate_limits.limits.{name}.max_requests must be greater than zero"
				)));
			}
			if settings.window_secs == 0 {
				return Err(ConfigError::Validation(format!(
					"rate_limits.limits.{name}.window_secs must be greater than zero"
				)));
			}
			if settings.window_secs > MAX_WINDOW_SECS {
				return Err(ConfigError::Validation(format!(
					"rate_limits.limits.{name}.window_secs must be at most {MAX_WINDOW_SECS}"
				)));
			}
		}

		let sweep_interval_secs = self
			.sweep_interval_secs
			.unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);
		if sweep_interval_secs == 0 {
			return Err(ConfigError::Validation(
				"rate_limits.sweep_interval_secs must be greater than zero".to_string(),
			));
		}

		Ok(RateLimitsConfig {
			sweep_interval_secs,
			limits,
		})
	}
}

fn missing(name: &str, field: &str) -> ConfigError {
	ConfigError::Validation(format!("rate_limits.limits.{name}.{field} is required"))
}

fn default_limits() -> BTreeMap<String, RateLimitSettings> {
	BTreeMap::from([
		(
			AI_LIMIT.to_string(),
			RateLimitSettings {
				max_requests: 30,
				window_secs: 60,
			},
		),
		(
			UPLOAD_LIMIT.to_string(),
			RateLimitSettings {
				max_requests: 10,
				window_secs: 60,
			},
		),
	])
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimitSettings {
	pub max_requests: u32,
	pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitsConfig {
	pub sweep_interval_secs: u64,
	pub limits: BTreeMap<String, RateLimitSettings>,
}

impl RateLimitsConfig {
	pub fn get(&self, name: &str) -> Option<RateLimitSettings> {
		self.limits.get(name).copied()
	}

	pub fn sweep_interval(&self) -> Duration {
		Duration::from_secs(self.sweep_interval_secs)
	}
}

impl Default for RateLimitsConfig {
	fn default() -> Self {
		Self {
			sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
			limits: default_limits(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_layer_gives_builtin_presets() {
		let config = RateLimitsConfigLayer::default().finalize().unwrap();
		assert_eq!(config, RateLimitsConfig::default());
		assert_eq!(
			config.get(AI_LIMIT),
			Some(RateLimitSettings {
				max_requests: 30,
				window_secs: 60
			})
		);
		assert_eq!(config.get(UPLOAD_LIMIT).unwrap().max_requests, 10);
		assert_eq!(config.sweep_interval_secs, 60);
	}

	#[test]
	fn partial_override_keeps_preset_fields() {
		let layer: RateLimitsConfigLayer = toml::from_str(
			r#"
[limits.ai]
max_requests = 5
"#,
		)
		.unwrap();
		let config = layer.finalize().unwrap();
		assert_eq!(
			config.get(AI_LIMIT),
			Some(RateLimitSettings {
				max_requests: 5,
				window_secs: 60
			})
		);
	}

	#[test]
	fn new_preset_needs_both_fields() {
		let mut layer = RateLimitsConfigLayer::default();
		layer.limits.insert(
			"export".to_string(),
			RateLimitSettingsLayer {
				max_requests: Some(3),
				window_secs: None,
			},
		);
		assert!(matches!(layer.finalize(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn zero_values_are_rejected() {
		let layer: RateLimitsConfigLayer = toml::from_str(
			r#"
[limits.upload]
window_secs = 0
"#,
		)
		.unwrap();
		assert!(layer.finalize().is_err());

		let layer = RateLimitsConfigLayer {
			sweep_interval_secs: Some(0),
			..Default::default()
		};
		assert!(layer.finalize().is_err());
	}

	#[test]
	fn oversized_window_is_rejected() {
		let layer: RateLimitsConfigLayer = toml::from_str(
			r#"
[limits.ai]
window_secs = 9223372036854775807
"#,
		)
		.unwrap();
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("window_secs must be at most"));

		let layer: RateLimitsConfigLayer = toml::from_str(&format!(
			"[limits.ai]\nwindow_secs = {MAX_WINDOW_SECS}\n"
		))
		.unwrap();
		assert!(layer.finalize().is_ok());
	}

	#[test]
	fn sweep_interval_as_duration() {
		let config = RateLimitsConfig::default();
		assert_eq!(config.sweep_interval(), Duration::from_secs(60));
	}

	#[test]
	fn merge_combines_named_limits() {
		let mut base = RateLimitsConfigLayer::default();
		base.limits.insert(
			AI_LIMIT.to_string(),
			RateLimitSettingsLayer {
				max_requests: Some(100),
				window_secs: Some(30),
			},
		);
		let mut overlay = RateLimitsConfigLayer {
			sweep_interval_secs: Some(15),
			..Default::default()
		};
		overlay.limits.insert(
			AI_LIMIT.to_string(),
			RateLimitSettingsLayer {
				max_requests: Some(50),
				window_secs: None,
			},
		);

		base.merge(overlay);
		let config = base.finalize().unwrap();
		assert_eq!(config.sweep_interval_secs, 15);
		assert_eq!(
			config.get(AI_LIMIT),
			Some(RateLimitSettings {
				max_requests: 50,
				window_secs: 30
			})
		);
	}
}
