// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The optional platform-native reporting capability.
//!
//! The pipeline treats this as a collaborator it may delegate to: device
//! identity, environment metadata, session mirroring, and native-side report
//! transmission. Availability is probed with [`NativeCapability::is_available`]
//! before every delegated call — the capability is never assumed present.

use async_trait::async_trait;
use serde_json::{Map, Value};

use cinder_core::{Breadcrumb, User};

/// Platform-side capability surface.
///
/// Mirroring calls (`set_tags`, `set_user`, `set_custom_data`,
/// `record_breadcrumb`, `send_crash_report`) are fire-and-forget bridge
/// calls; only the probes and the environment lookup suspend.
#[async_trait]
pub trait NativeCapability: Send + Sync {
	/// Whether the native module is present and usable.
	fn is_available(&self) -> bool;

	/// Stable per-device identifier, when the platform exposes one.
	fn device_id(&self) -> Option<String>;

	/// Whether a previous run of the host already initialized the module.
	async fn has_initialized(&self) -> bool;

	async fn init(&self, api_key: &str, rum_enabled: bool, app_version: &str);

	/// Best-effort environment metadata; `None` when unavailable.
	async fn environment_info(&self) -> Option<Map<String, Value>>;

	fn set_tags(&self, tags: &[String]);

	fn set_user(&self, user: &User);

	fn set_custom_data(&self, data: &Map<String, Value>);

	fn record_breadcrumb(&self, breadcrumb: &Breadcrumb);

	/// Hands a serialized report to the native transmission path.
	fn send_crash_report(&self, payload_json: &str, api_key: &str);
}

/// Placeholder used when the host platform provides no native module.
#[derive(Debug, Default)]
pub struct NoNative;

#[async_trait]
impl NativeCapability for NoNative {
	fn is_available(&self) -> bool {
		false
	}

	fn device_id(&self) -> Option<String> {
		None
	}

	async fn has_initialized(&self) -> bool {
		false
	}

	async fn init(&self, _api_key: &str, _rum_enabled: bool, _app_version: &str) {}

	async fn environment_info(&self) -> Option<Map<String, Value>> {
		None
	}

	fn set_tags(&self, _tags: &[String]) {}

	fn set_user(&self, _user: &User) {}

	fn set_custom_data(&self, _data: &Map<String, Value>) {}

	fn record_breadcrumb(&self, _breadcrumb: &Breadcrumb) {}

	fn send_crash_report(&self, _payload_json: &str, _api_key: &str) {}
}
