// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use warden_server_config::RateLimitsConfig;

use crate::config::RateLimitConfig;
use crate::store::{InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};
use crate::sweep::SweepTask;

/// How often the background sweeper runs unless configured otherwise.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Build a key namespaced by limiter purpose, e.g. `ai:user-42`.
///
/// Every purpose shares one keyspace in the store, so two limits applied to
/// the same identity must use different scopes.
pub fn rate_limit_key(scope: &str, identity: &str) -> String {
	format!("{scope}:{identity}")
}

/// Fixed-window rate limiter shared across request handlers.
///
/// Cloning is cheap; clones share the same store.
#[derive(Clone)]
pub struct RateLimiter {
	store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
	/// Limiter over a fresh in-memory store.
	pub fn new() -> Self {
		Self::with_store(Arc::new(InMemoryRateLimitStore::new()))
	}

	pub fn with_store(store: Arc<dyn RateLimitStore>) -> Self {
		Self { store }
	}

	pub fn store(&self) -> &Arc<dyn RateLimitStore> {
		&self.store
	}

	/// Count a request for `key` and decide whether it is admitted.
	///
	/// The limiter does not namespace keys. Callers applying more than one
	/// limit to the same identity build keys with [`rate_limit_key`].
	pub fn check(&self, config: &RateLimitConfig, key: &str) -> RateLimitDecision {
		self.check_at(config, key, Instant::now())
	}

	pub fn check_at(&self, config: &RateLimitConfig, key: &str, now: Instant) -> RateLimitDecision {
		let decision = self.store.check_and_increment(key, config, now);
		if decision.allowed {
			debug!(
				key = key,
				remaining = decision.remaining,
				"Rate limit check passed"
			);
		} else {
			warn!(
				key = key,
				max_requests = config.max_requests(),
				window_secs = config.window().as_secs(),
				"Rate limit exceeded"
			);
		}
		decision
	}

	pub fn sweep_expired(&self) -> usize {
		self.sweep_expired_at(Instant::now())
	}

	pub fn sweep_expired_at(&self, now: Instant) -> usize {
		let removed = self.store.sweep_expired(now);
		if removed > 0 {
			debug!(removed, remaining = self.store.len(), "Swept expired rate limit windows");
		}
		removed
	}

	/// Forget `key`'s window. Its next request opens a new one.
	pub fn reset(&self, key: &str) -> bool {
		self.store.remove(key)
	}

	pub fn tracked_keys(&self) -> usize {
		self.store.len()
	}

	/// Start the periodic sweep on the current Tokio runtime.
	///
	/// # Panics
	///
	/// Panics if called outside a Tokio runtime.
	pub fn spawn_sweeper(&self, interval: Duration) -> SweepTask {
		SweepTask::spawn(self.clone(), interval)
	}

	/// Start the periodic sweep at the configured `sweep_interval_secs`.
	pub fn spawn_sweeper_from(&self, config: &RateLimitsConfig) -> SweepTask {
		self.spawn_sweeper(config.sweep_interval())
	}
}

impl Default for RateLimiter {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for RateLimiter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RateLimiter")
			.field("tracked_keys", &self.store.len())
			.finish()
	}
}
