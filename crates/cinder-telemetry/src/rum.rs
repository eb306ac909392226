// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Real user monitoring: timing-event emission through a platform monitor.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use cinder_core::RumTimingEvent;

use crate::error::Result;

/// Platform monitor that owns RUM session lifecycle and event transport.
#[async_trait]
pub trait RealtimeMonitor: Send + Sync {
	/// One-time setup: network instrumentation and the URL ignore list.
	fn setup(&self, api_key: &str, enable_network_monitoring: bool, ignore_urls: &[String]);

	async fn send_timing(&self, event: &RumTimingEvent) -> Result<()>;
}

/// Emits timing events when monitoring is enabled; otherwise warns and
/// drops them.
pub struct RumEmitter {
	monitor: Option<Arc<dyn RealtimeMonitor>>,
}

impl RumEmitter {
	/// An emitter with monitoring off. Every send is a warned no-op.
	pub fn disabled() -> Self {
		Self { monitor: None }
	}

	pub fn new(monitor: Arc<dyn RealtimeMonitor>) -> Self {
		Self {
			monitor: Some(monitor),
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.monitor.is_some()
	}

	pub async fn send_timing(&self, event: &RumTimingEvent) -> Result<()> {
		match &self.monitor {
			Some(monitor) => monitor.send_timing(event).await,
			None => {
				warn!(
					name = %event.name,
					"Real user monitoring is not enabled; dropping timing event"
				);
				Ok(())
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cinder_core::RumEventType;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingMonitor {
		events: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl RealtimeMonitor for RecordingMonitor {
		fn setup(&self, _api_key: &str, _enable_network_monitoring: bool, _ignore_urls: &[String]) {}

		async fn send_timing(&self, event: &RumTimingEvent) -> Result<()> {
			self.events.lock().unwrap().push(event.name.clone());
			Ok(())
		}
	}

	fn event(name: &str) -> RumTimingEvent {
		RumTimingEvent::new(RumEventType::ActivityLoaded, name, 12.5, "anonymous-device-1")
	}

	#[tokio::test]
	async fn enabled_emitter_forwards_to_the_monitor() {
		let monitor = Arc::new(RecordingMonitor::default());
		let emitter = RumEmitter::new(Arc::clone(&monitor) as Arc<dyn RealtimeMonitor>);
		assert!(emitter.is_enabled());

		emitter.send_timing(&event("MainActivity")).await.unwrap();
		assert_eq!(*monitor.events.lock().unwrap(), vec!["MainActivity"]);
	}

	#[tokio::test]
	async fn disabled_emitter_drops_events_without_error() {
		let emitter = RumEmitter::disabled();
		assert!(!emitter.is_enabled());
		emitter.send_timing(&event("MainActivity")).await.unwrap();
	}
}
