// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Retry logic with exponential backoff for transient failures.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Classifies whether an error is worth retrying.
pub trait RetryableError {
	fn is_retryable(&self) -> bool;
}

impl RetryableError for reqwest::Error {
	fn is_retryable(&self) -> bool {
		if self.is_timeout() || self.is_connect() {
			return true;
		}
		self
			.status()
			.map(|s| matches!(s.as_u16(), 408 | 429 | 500 | 502 | 503 | 504))
			.unwrap_or(false)
	}
}

/// Configuration for [`retry`].
#[derive(Debug, Clone)]
pub struct RetryConfig {
	/// Total attempts, including the first.
	pub max_attempts: u32,
	/// Backoff before the first retry; doubles per attempt.
	pub initial_backoff: Duration,
	/// Upper bound on any single backoff.
	pub max_backoff: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_attempts: 3,
			initial_backoff: Duration::from_millis(200),
			max_backoff: Duration::from_secs(5),
		}
	}
}

impl RetryConfig {
	fn backoff_for(&self, attempt: u32) -> Duration {
		let base = self
			.initial_backoff
			.saturating_mul(2u32.saturating_pow(attempt));
		let capped = base.min(self.max_backoff);
		// Full jitter: anywhere between half and the full backoff.
		let jittered = capped.as_millis() as f64 * (0.5 + fastrand::f64() * 0.5);
		Duration::from_millis(jittered as u64)
	}
}

/// Runs an async operation, retrying retryable failures with exponential
/// backoff and jitter. Non-retryable errors return immediately.
pub async fn retry<F, Fut, T, E>(config: &RetryConfig, mut op: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: RetryableError,
{
	let mut attempt = 0u32;
	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(e) if e.is_retryable() && attempt + 1 < config.max_attempts => {
				let backoff = config.backoff_for(attempt);
				debug!(attempt, backoff_ms = backoff.as_millis() as u64, "Retrying after transient failure");
				tokio::time::sleep(backoff).await;
				attempt += 1;
			}
			Err(e) => return Err(e),
		}
	}
}
