// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use thiserror::Error;
use warden_server_config::{RateLimitSettings, MAX_WINDOW_SECS};

/// Longest window a limit may use.
pub const MAX_WINDOW: Duration = Duration::from_secs(MAX_WINDOW_SECS);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitConfigError {
	#[error("max_requests must be greater than zero")]
	ZeroMaxRequests,

	#[error("window must be longer than zero")]
	ZeroWindow,

	#[error("window must be at most {max_secs}s")]
	WindowTooLong { max_secs: u64 },
}

/// How many requests a key may make per fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
	max_requests: u32,
	window: Duration,
}

impl RateLimitConfig {
	/// AI completion calls: 30 per minute.
	pub const AI: RateLimitConfig = RateLimitConfig {
		max_requests: 30,
		window: Duration::from_secs(60),
	};

	/// File uploads: 10 per minute.
	pub const UPLOAD: RateLimitConfig = RateLimitConfig {
		max_requests: 10,
		window: Duration::from_secs(60),
	};

	pub fn new(max_requests: u32, window: Duration) -> Result<Self, RateLimitConfigError> {
		if max_requests == 0 {
			return Err(RateLimitConfigError::ZeroMaxRequests);
		}
		if window.is_zero() {
			return Err(RateLimitConfigError::ZeroWindow);
		}
		if window > MAX_WINDOW {
			return Err(RateLimitConfigError::WindowTooLong {
				max_secs: MAX_WINDOW_SECS,
			});
		}
		Ok(Self {
			max_requests,
			window,
		})
	}

	pub fn max_requests(&self) -> u32 {
		self.max_requests
	}

	pub fn window(&self) -> Duration {
		self.window
	}
}

impl TryFrom<RateLimitSettings> for RateLimitConfig {
	type Error = RateLimitConfigError;

	fn try_from(settings: RateLimitSettings) -> Result<Self, Self::Error> {
		Self::new(
			settings.max_requests,
			Duration::from_secs(settings.window_secs),
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use warden_server_config::{RateLimitsConfig, AI_LIMIT, UPLOAD_LIMIT};

	#[test]
	fn rejects_zero_values() {
		assert_eq!(
			RateLimitConfig::new(0, Duration::from_secs(1)),
			Err(RateLimitConfigError::ZeroMaxRequests)
		);
		assert_eq!(
			RateLimitConfig::new(1, Duration::ZERO),
			Err(RateLimitConfigError::ZeroWindow)
		);
	}

	#[test]
	fn rejects_windows_past_maximum() {
		let too_long = RateLimitConfigError::WindowTooLong {
			max_secs: MAX_WINDOW_SECS,
		};
		assert_eq!(RateLimitConfig::new(5, Duration::MAX), Err(too_long.clone()));
		assert_eq!(
			RateLimitConfig::try_from(RateLimitSettings {
				max_requests: 5,
				window_secs: u64::MAX,
			}),
			Err(too_long)
		);
		assert!(RateLimitConfig::new(5, MAX_WINDOW).is_ok());
	}

	#[test]
	fn presets_match_default_configuration() {
		let defaults = RateLimitsConfig::default();
		let ai = RateLimitConfig::try_from(defaults.get(AI_LIMIT).unwrap()).unwrap();
		let upload = RateLimitConfig::try_from(defaults.get(UPLOAD_LIMIT).unwrap()).unwrap();

		assert_eq!(ai, RateLimitConfig::AI);
		assert_eq!(upload, RateLimitConfig::UPLOAD);
	}
}
