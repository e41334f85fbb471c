// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-key fixed-window rate limiting.
//!
//! Each key gets a window of `window` length starting at its first request.
//! Up to `max_requests` requests are admitted inside the window; the rest
//! are denied until the window ends, when the next request opens a new one.
//! A background [`SweepTask`] evicts windows nobody has touched since they
//! expired.
//!
//! ```ignore
//! let limiter = RateLimiter::new();
//! let config = warden_server_config::load_config()?;
//! let _sweeper = limiter.spawn_sweeper_from(&config.rate_limits);
//!
//! let decision = limiter.check(&RateLimitConfig::AI, &rate_limit_key("ai", &user_id));
//! if !decision.allowed {
//!     return Err(TooManyRequests);
//! }
//! ```

pub mod config;
pub mod limiter;
pub mod store;
pub mod sweep;

pub use config::{RateLimitConfig, RateLimitConfigError, MAX_WINDOW};
pub use limiter::{rate_limit_key, RateLimiter, DEFAULT_SWEEP_INTERVAL};
pub use store::{InMemoryRateLimitStore, RateLimitDecision, RateLimitEntry, RateLimitStore};
pub use sweep::SweepTask;
