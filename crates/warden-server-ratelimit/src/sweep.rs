// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::limiter::RateLimiter;

/// Handle to the background task that evicts expired windows.
///
/// Dropping the handle cancels the task without waiting for it; call
/// [`SweepTask::shutdown`] to cancel and join.
#[derive(Debug)]
pub struct SweepTask {
	cancellation_token: CancellationToken,
	handle: Option<JoinHandle<()>>,
}

impl SweepTask {
	pub(crate) fn spawn(limiter: RateLimiter, interval: Duration) -> Self {
		let cancellation_token = CancellationToken::new();
		let token = cancellation_token.clone();

		let handle = tokio::spawn(async move {
			info!(interval_secs = interval.as_secs(), "Rate limit sweeper started");
			loop {
				tokio::select! {
					_ = tokio::time::sleep(interval) => {
						limiter.sweep_expired();
					}
					_ = token.cancelled() => {
						info!("Shutting down rate limit sweeper");
						break;
					}
				}
			}
		});

		Self {
			cancellation_token,
			handle: Some(handle),
		}
	}

	pub fn cancel(&self) {
		self.cancellation_token.cancel();
	}

	pub fn is_finished(&self) -> bool {
		self.handle.as_ref().map_or(true, JoinHandle::is_finished)
	}

	/// Cancel the sweeper and wait for it to exit.
	pub async fn shutdown(mut self) {
		self.cancellation_token.cancel();
		if let Some(handle) = self.handle.take() {
			if let Err(e) = handle.await {
				warn!(error = %e, "Rate limit sweeper ended abnormally");
			}
		}
	}
}

impl Drop for SweepTask {
	fn drop(&mut self) {
		self.cancellation_token.cancel();
	}
}
