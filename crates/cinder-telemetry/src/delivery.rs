// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Store-and-forward delivery: direct submission with a durable fallback
//! queue, and opportunistic redelivery of queued reports.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{CachedReport, ReportCache};
use crate::error::Result;
use crate::transport::RemoteCollector;

#[derive(Debug, Clone)]
pub struct DeliveryConfig {
	/// Bound on redelivery attempts per cached report; `None` keeps
	/// retrying until the report leaves the cache some other way.
	pub max_resend_attempts: Option<u32>,
	/// Delay before the startup flush of previously cached reports.
	pub flush_delay: Duration,
}

impl Default for DeliveryConfig {
	fn default() -> Self {
		Self {
			max_resend_attempts: None,
			flush_delay: Duration::from_millis(10),
		}
	}
}

/// Submits reports to the collector, caching any that fail and replaying
/// the cache opportunistically.
pub struct Delivery {
	collector: Arc<dyn RemoteCollector>,
	cache: ReportCache,
	config: DeliveryConfig,
	// Serializes flush passes; a second caller finding the gate held can
	// simply skip, the running pass covers its entries.
	flush_gate: tokio::sync::Mutex<()>,
}

impl Delivery {
	pub fn new(collector: Arc<dyn RemoteCollector>, cache: ReportCache, config: DeliveryConfig) -> Self {
		Self {
			collector,
			cache,
			config,
			flush_gate: tokio::sync::Mutex::new(()),
		}
	}

	pub fn cache(&self) -> &ReportCache {
		&self.cache
	}

	/// Submits one report. Failures are cached for later redelivery, never
	/// surfaced to the capture path.
	pub async fn send(&self, api_key: &str, body: String) {
		match self.collector.submit(api_key, &body).await {
			Ok(()) => {
				debug!("Report delivered");
			}
			Err(e) => {
				warn!(error = %e, "Delivery failed; caching report");
				let cached = CachedReport {
					api_key: api_key.to_string(),
					attempts: 1,
					body,
				};
				if let Err(e) = self.cache.store(&cached) {
					warn!(error = %e, "Failed to cache undelivered report");
				}
			}
		}
	}

	/// Replays cached reports for the given API key in FIFO order. The pass
	/// stops at the first failed submission; remaining entries wait for the
	/// next flush. Concurrent calls coalesce into the running pass.
	pub async fn flush_cached(&self, api_key: &str) -> Result<usize> {
		let _gate = match self.flush_gate.try_lock() {
			Ok(gate) => gate,
			Err(_) => {
				debug!("Flush already in progress; skipping");
				return Ok(0);
			}
		};

		let entries = self.cache.load(api_key)?;
		if entries.is_empty() {
			return Ok(0);
		}
		info!(count = entries.len(), "Flushing cached reports");

		let mut delivered = 0usize;
		for mut entry in entries {
			match self.collector.submit(api_key, &entry.report.body).await {
				Ok(()) => {
					self.cache.remove(&entry)?;
					delivered += 1;
				}
				Err(e) => {
					self.cache.record_attempt(&mut entry)?;
					if let Some(bound) = self.config.max_resend_attempts {
						if entry.report.attempts >= bound {
							warn!(
								attempts = entry.report.attempts,
								"Dropping report after exhausting redelivery attempts"
							);
							self.cache.remove(&entry)?;
						}
					}
					// The collector just failed; later entries wait for the
					// next pass whether or not this one was dropped.
					warn!(error = %e, "Redelivery failed; stopping flush pass");
					break;
				}
			}
		}
		Ok(delivered)
	}
}
