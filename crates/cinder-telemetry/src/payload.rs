// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload construction: combining a captured error, normalized frames, and
//! a session snapshot into an immutable crash report.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Offset, Utc};
use serde_json::{Map, Value};
use tracing::warn;

use cinder_core::{
	CapturedError, ClientDetails, CrashReportPayload, EnvironmentDetails, ErrorDetails,
	PayloadBreadcrumb, PayloadDetails, PayloadFrame, PayloadUser, Session, StackFrame,
};

use crate::native::NativeCapability;

/// SDK version attached as the client version of every report.
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bound on the best-effort environment lookup; it must not be allowed to
/// stall payload construction.
const ENVIRONMENT_INFO_TIMEOUT: Duration = Duration::from_secs(2);

/// Builds [`CrashReportPayload`]s. Construction is pure given its inputs,
/// aside from the bounded environment side-call and a current-timestamp
/// read; the session snapshot is never mutated.
pub struct PayloadBuilder {
	native: Arc<dyn NativeCapability>,
	client_name: String,
	app_version: String,
}

impl PayloadBuilder {
	pub fn new(native: Arc<dyn NativeCapability>, app_version: impl Into<String>) -> Self {
		Self {
			native,
			client_name: format!("cinder-telemetry.{}", std::env::consts::OS),
			app_version: app_version.into(),
		}
	}

	pub async fn build(
		&self,
		error: &CapturedError,
		frames: &[StackFrame],
		session: &Session,
	) -> CrashReportPayload {
		let extra = self.environment_info().await;
		let utc_offset = utc_offset_hours(Local::now().offset().fix());

		CrashReportPayload {
			occurred_on: Utc::now(),
			details: PayloadDetails {
				error: ErrorDetails {
					class_name: error.class_name.clone(),
					message: error.message.clone(),
					stack_trace: frames.iter().map(PayloadFrame::from).collect(),
					stack_string: error.stack_string.clone(),
				},
				environment: EnvironmentDetails::new(utc_offset, extra),
				client: ClientDetails {
					name: self.client_name.clone(),
					version: SDK_VERSION.to_string(),
				},
				user_custom_data: session.custom_data.clone(),
				tags: session.tags.clone(),
				user: PayloadUser::from(&session.user),
				breadcrumbs: session.breadcrumbs.iter().map(PayloadBreadcrumb::from).collect(),
				version: if self.app_version.is_empty() {
					"Not supplied".to_string()
				} else {
					self.app_version.clone()
				},
			},
		}
	}

	/// Best-effort environment metadata: unavailable, failed, or slow
	/// lookups all degrade to an empty map.
	async fn environment_info(&self) -> Map<String, Value> {
		if !self.native.is_available() {
			return Map::new();
		}
		match tokio::time::timeout(ENVIRONMENT_INFO_TIMEOUT, self.native.environment_info()).await {
			Ok(Some(info)) => info,
			Ok(None) => Map::new(),
			Err(_) => {
				warn!("Environment info lookup timed out; continuing without it");
				Map::new()
			}
		}
	}
}

/// Hours behind UTC, positive to the west. UTC-5 reports +5.0.
fn utc_offset_hours(offset: chrono::FixedOffset) -> f64 {
	f64::from(-offset.local_minus_utc()) / 3600.0
}
