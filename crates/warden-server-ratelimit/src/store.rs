// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage seam for rate-limit windows.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::RateLimitConfig;

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
	pub allowed: bool,
	/// Requests left in the current window after this one.
	pub remaining: u32,
	/// When the key's window ends.
	pub reset_at: Instant,
}

/// One key's fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
	pub count: u32,
	pub reset_at: Instant,
}

impl RateLimitEntry {
	/// A fresh window holding the request that opened it.
	pub fn open(config: &RateLimitConfig, now: Instant) -> Self {
		Self {
			count: 1,
			reset_at: window_end(now, config.window()),
		}
	}

	pub fn is_expired(&self, now: Instant) -> bool {
		now >= self.reset_at
	}

	/// Count one more request against a live window. A denied request
	/// leaves the entry untouched.
	pub fn admit(&mut self, config: &RateLimitConfig) -> RateLimitDecision {
		if self.count < config.max_requests() {
			self.count += 1;
			RateLimitDecision {
				allowed: true,
				remaining: config.max_requests() - self.count,
				reset_at: self.reset_at,
			}
		} else {
			RateLimitDecision {
				allowed: false,
				remaining: 0,
				reset_at: self.reset_at,
			}
		}
	}

	fn first_decision(&self, config: &RateLimitConfig) -> RateLimitDecision {
		RateLimitDecision {
			allowed: true,
			remaining: config.max_requests().saturating_sub(self.count),
			reset_at: self.reset_at,
		}
	}
}

/// `now + window`, saturating at the furthest instant the platform can
/// represent.
fn window_end(now: Instant, window: Duration) -> Instant {
	let mut window = window;
	loop {
		if let Some(end) = now.checked_add(window) {
			return end;
		}
		window /= 2;
	}
}

/// Backing store for [`crate::RateLimiter`].
///
/// `check_and_increment` must be atomic per key: the read, the window test
/// and the increment happen as one step with respect to every other call on
/// the same store, otherwise concurrent callers could overshoot the limit.
pub trait RateLimitStore: Send + Sync {
	fn check_and_increment(
		&self,
		key: &str,
		config: &RateLimitConfig,
		now: Instant,
	) -> RateLimitDecision;

	/// Drop every entry whose window ended at or before `now`. Returns how
	/// many were removed.
	fn sweep_expired(&self, now: Instant) -> usize;

	fn get(&self, key: &str) -> Option<RateLimitEntry>;

	fn remove(&self, key: &str) -> bool;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Process-local store: one map behind one lock.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
	entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl RateLimitStore for InMemoryRateLimitStore {
	fn check_and_increment(
		&self,
		key: &str,
		config: &RateLimitConfig,
		now: Instant,
	) -> RateLimitDecision {
		let mut entries = self.entries.lock();

		if let Some(entry) = entries.get_mut(key) {
			if !entry.is_expired(now) {
				return entry.admit(config);
			}
		}

		let entry = RateLimitEntry::open(config, now);
		entries.insert(key.to_owned(), entry);
		entry.first_decision(config)
	}

	fn sweep_expired(&self, now: Instant) -> usize {
		let mut entries = self.entries.lock();
		let before = entries.len();
		entries.retain(|_, entry| !entry.is_expired(now));
		before - entries.len()
	}

	fn get(&self, key: &str) -> Option<RateLimitEntry> {
		self.entries.lock().get(key).copied()
	}

	fn remove(&self, key: &str) -> bool {
		self.entries.lock().remove(key).is_some()
	}

	fn len(&self) -> usize {
		self.entries.lock().len()
	}
}
