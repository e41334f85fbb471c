// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod logging;
mod rate_limits;

pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer, RuntimeMode};
pub use rate_limits::{
	RateLimitSettings, RateLimitSettingsLayer, RateLimitsConfig, RateLimitsConfigLayer,
	AI_LIMIT, MAX_WINDOW_SECS, UPLOAD_LIMIT,
};
