// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration surface for the telemetry client.

use std::fmt;
use std::sync::Arc;

use cinder_core::CrashReportPayload;

/// Pre-send filter: receives the frozen payload and may return `false` to
/// suppress sending (and caching) entirely. It cannot alter the payload.
pub type OnBeforeSend = Arc<dyn Fn(&CrashReportPayload) -> bool + Send + Sync>;

/// Options consumed by [`TelemetryClientBuilder::init`](crate::TelemetryClientBuilder).
#[derive(Clone)]
pub struct ClientOptions {
	/// Destination API key; required for any delivery.
	pub api_key: String,
	/// Application version attached to every report.
	pub version: String,
	pub enable_network_monitoring: bool,
	pub enable_native_crash_reporting: bool,
	pub enable_rum: bool,
	/// URL patterns excluded from RUM network interception.
	pub ignore_urls: Vec<String>,
	pub on_before_send: Option<OnBeforeSend>,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			api_key: String::new(),
			version: String::new(),
			enable_network_monitoring: true,
			enable_native_crash_reporting: true,
			enable_rum: false,
			ignore_urls: Vec::new(),
			on_before_send: None,
		}
	}
}

impl ClientOptions {
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			..Self::default()
		}
	}

	pub fn with_version(mut self, version: impl Into<String>) -> Self {
		self.version = version.into();
		self
	}

	pub fn with_network_monitoring(mut self, enabled: bool) -> Self {
		self.enable_network_monitoring = enabled;
		self
	}

	pub fn with_native_crash_reporting(mut self, enabled: bool) -> Self {
		self.enable_native_crash_reporting = enabled;
		self
	}

	pub fn with_rum(mut self, enabled: bool) -> Self {
		self.enable_rum = enabled;
		self
	}

	pub fn with_ignore_urls(mut self, urls: Vec<String>) -> Self {
		self.ignore_urls = urls;
		self
	}

	pub fn with_on_before_send(mut self, filter: OnBeforeSend) -> Self {
		self.on_before_send = Some(filter);
		self
	}
}

impl fmt::Debug for ClientOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ClientOptions")
			.field("api_key", &"<redacted>")
			.field("version", &self.version)
			.field("enable_network_monitoring", &self.enable_network_monitoring)
			.field("enable_native_crash_reporting", &self.enable_native_crash_reporting)
			.field("enable_rum", &self.enable_rum)
			.field("ignore_urls", &self.ignore_urls)
			.field("on_before_send", &self.on_before_send.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_documented_values() {
		let options = ClientOptions::default();
		assert!(options.enable_network_monitoring);
		assert!(options.enable_native_crash_reporting);
		assert!(!options.enable_rum);
		assert!(options.ignore_urls.is_empty());
		assert!(options.version.is_empty());
		assert!(options.on_before_send.is_none());
	}

	#[test]
	fn debug_redacts_api_key() {
		let options = ClientOptions::new("secret-key-123");
		let rendered = format!("{options:?}");
		assert!(!rendered.contains("secret-key-123"));
	}
}
