// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use warden_server_config::{RateLimitsConfigLayer, MAX_WINDOW_SECS};
use warden_server_ratelimit::{
	InMemoryRateLimitStore, RateLimitConfig, RateLimitDecision, RateLimitEntry, RateLimitStore,
	RateLimiter,
};

fn config(max: u32, window_ms: u64) -> RateLimitConfig {
	RateLimitConfig::new(max, Duration::from_millis(window_ms)).unwrap()
}

fn summary(decision: RateLimitDecision) -> (bool, u32) {
	(decision.allowed, decision.remaining)
}

#[test]
fn admits_up_to_max_then_denies() {
	let limiter = RateLimiter::new();
	let cfg = config(3, 1000);
	let t0 = Instant::now();

	let results: Vec<_> = (0..4)
		.map(|i| summary(limiter.check_at(&cfg, "k", t0 + Duration::from_millis(i * 10))))
		.collect();

	assert_eq!(results, vec![(true, 2), (true, 1), (true, 0), (false, 0)]);
}

#[test]
fn new_window_after_reset_time() {
	let limiter = RateLimiter::new();
	let cfg = config(3, 1000);
	let t0 = Instant::now();

	for _ in 0..3 {
		limiter.check_at(&cfg, "k", t0);
	}
	let next = limiter.check_at(&cfg, "k", t0 + Duration::from_millis(1000));

	assert_eq!(summary(next), (true, 2));
	assert_eq!(next.reset_at, t0 + Duration::from_millis(2000));
}

#[test]
fn denial_does_not_extend_window() {
	let limiter = RateLimiter::new();
	let cfg = config(1, 1000);
	let t0 = Instant::now();

	assert!(limiter.check_at(&cfg, "k", t0).allowed);
	let denied = limiter.check_at(&cfg, "k", t0 + Duration::from_millis(500));
	assert!(!denied.allowed);
	assert_eq!(denied.reset_at, t0 + Duration::from_millis(1000));

	assert!(limiter.check_at(&cfg, "k", t0 + Duration::from_millis(1000)).allowed);
}

#[test]
fn keys_are_independent() {
	let limiter = RateLimiter::new();
	let cfg = config(2, 1000);
	let t0 = Instant::now();

	limiter.check_at(&cfg, "a", t0);
	limiter.check_at(&cfg, "a", t0);
	assert!(!limiter.check_at(&cfg, "a", t0).allowed);

	assert_eq!(summary(limiter.check_at(&cfg, "b", t0)), (true, 1));
}

#[test]
fn single_request_limit() {
	let limiter = RateLimiter::new();
	let t0 = Instant::now();

	assert_eq!(summary(limiter.check_at(&config(1, 1000), "k", t0)), (true, 0));
	assert_eq!(summary(limiter.check_at(&config(1, 1000), "k", t0)), (false, 0));
}

#[test]
fn sweep_removes_only_expired_entries() {
	let limiter = RateLimiter::new();
	let t0 = Instant::now();

	limiter.check_at(&config(5, 100), "short", t0);
	limiter.check_at(&config(5, 60_000), "long", t0);

	assert_eq!(limiter.sweep_expired_at(t0 + Duration::from_millis(50)), 0);
	assert_eq!(limiter.tracked_keys(), 2);

	assert_eq!(limiter.sweep_expired_at(t0 + Duration::from_millis(200)), 1);
	assert_eq!(limiter.tracked_keys(), 1);
	assert!(limiter.store().get("long").is_some());
	assert!(limiter.store().get("short").is_none());
}

#[test]
fn swept_key_starts_fresh() {
	let limiter = RateLimiter::new();
	let cfg = config(2, 100);
	let t0 = Instant::now();

	limiter.check_at(&cfg, "k", t0);
	limiter.check_at(&cfg, "k", t0);
	limiter.sweep_expired_at(t0 + Duration::from_millis(150));

	let after = limiter.check_at(&cfg, "k", t0 + Duration::from_millis(160));
	assert_eq!(summary(after), (true, 1));
}

#[test]
fn concurrent_threads_never_exceed_limit() {
	const THREADS: usize = 64;
	const LIMIT: u32 = 10;

	let limiter = RateLimiter::new();
	let cfg = config(LIMIT, 60_000);
	let barrier = Arc::new(Barrier::new(THREADS));
	let admitted = Arc::new(AtomicUsize::new(0));

	let handles: Vec<_> = (0..THREADS)
		.map(|_| {
			let limiter = limiter.clone();
			let barrier = Arc::clone(&barrier);
			let admitted = Arc::clone(&admitted);
			thread::spawn(move || {
				barrier.wait();
				if limiter.check(&cfg, "shared").allowed {
					admitted.fetch_add(1, Ordering::SeqCst);
				}
			})
		})
		.collect();

	for handle in handles {
		handle.join().unwrap();
	}

	assert_eq!(admitted.load(Ordering::SeqCst), LIMIT as usize);
	assert_eq!(limiter.store().get("shared").unwrap().count, LIMIT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_never_exceed_limit() {
	let limiter = RateLimiter::new();
	let cfg = config(5, 60_000);

	let handles: Vec<_> = (0..50)
		.map(|_| {
			let limiter = limiter.clone();
			tokio::spawn(async move { limiter.check(&cfg, "shared").allowed })
		})
		.collect();

	let mut admitted = 0;
	for handle in handles {
		if handle.await.unwrap() {
			admitted += 1;
		}
	}

	assert_eq!(admitted, 5);
}

/// Store wrapper that counts sweeps so the background task is observable.
#[derive(Default)]
struct CountingStore {
	inner: InMemoryRateLimitStore,
	sweeps: AtomicUsize,
}

impl RateLimitStore for CountingStore {
	fn check_and_increment(
		&self,
		key: &str,
		config: &RateLimitConfig,
		now: Instant,
	) -> RateLimitDecision {
		self.inner.check_and_increment(key, config, now)
	}

	fn sweep_expired(&self, now: Instant) -> usize {
		self.sweeps.fetch_add(1, Ordering::SeqCst);
		self.inner.sweep_expired(now)
	}

	fn get(&self, key: &str) -> Option<RateLimitEntry> {
		self.inner.get(key)
	}

	fn remove(&self, key: &str) -> bool {
		self.inner.remove(key)
	}

	fn len(&self) -> usize {
		self.inner.len()
	}
}

#[tokio::test(start_paused = true)]
async fn sweeper_runs_each_interval_until_shutdown() {
	let store = Arc::new(CountingStore::default());
	let limiter = RateLimiter::with_store(store.clone());

	limiter.check(&config(1, 1), "stale");
	thread::sleep(Duration::from_millis(5));

	let sweeper = limiter.spawn_sweeper(Duration::from_secs(60));
	assert_eq!(store.sweeps.load(Ordering::SeqCst), 0);

	tokio::time::sleep(Duration::from_secs(61)).await;
	assert_eq!(store.sweeps.load(Ordering::SeqCst), 1);
	assert_eq!(limiter.tracked_keys(), 0);

	tokio::time::sleep(Duration::from_secs(60)).await;
	assert_eq!(store.sweeps.load(Ordering::SeqCst), 2);

	sweeper.shutdown().await;

	tokio::time::sleep(Duration::from_secs(600)).await;
	assert_eq!(store.sweeps.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn sweeper_uses_configured_interval() {
	let store = Arc::new(CountingStore::default());
	let limiter = RateLimiter::with_store(store.clone());
	let config = RateLimitsConfigLayer {
		sweep_interval_secs: Some(15),
		..Default::default()
	}
	.finalize()
	.unwrap();

	let sweeper = limiter.spawn_sweeper_from(&config);
	tokio::time::sleep(Duration::from_secs(16)).await;
	assert_eq!(store.sweeps.load(Ordering::SeqCst), 1);

	sweeper.shutdown().await;
}

#[test]
fn longest_window_still_admits() {
	let limiter = RateLimiter::new();
	let cfg = RateLimitConfig::new(2, Duration::from_secs(MAX_WINDOW_SECS)).unwrap();
	let t0 = Instant::now();

	let first = limiter.check_at(&cfg, "k", t0);
	assert_eq!(summary(first), (true, 1));
	assert!(first.reset_at > t0);
}

#[tokio::test]
async fn cancel_stops_sweeper() {
	let limiter = RateLimiter::new();
	let sweeper = limiter.spawn_sweeper(Duration::from_secs(60));
	assert!(!sweeper.is_finished());

	sweeper.cancel();
	tokio::time::timeout(Duration::from_secs(5), async {
		while !sweeper.is_finished() {
			tokio::task::yield_now().await;
		}
	})
	.await
	.unwrap();
	drop(sweeper);
}

proptest! {
	#[test]
	fn admitted_count_never_exceeds_max(max in 1u32..20, attempts in 0usize..60) {
		let limiter = RateLimiter::new();
		let cfg = config(max, 60_000);
		let t0 = Instant::now();

		let admitted = (0..attempts)
			.filter(|_| limiter.check_at(&cfg, "k", t0).allowed)
			.count();

		prop_assert_eq!(admitted, attempts.min(max as usize));
	}

	#[test]
	fn remaining_counts_down(max in 1u32..20) {
		let limiter = RateLimiter::new();
		let cfg = config(max, 60_000);
		let t0 = Instant::now();

		for expected in (0..max).rev() {
			let decision = limiter.check_at(&cfg, "k", t0);
			prop_assert!(decision.allowed);
			prop_assert_eq!(decision.remaining, expected);
		}
	}
}
