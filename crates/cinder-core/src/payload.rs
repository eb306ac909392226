// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash report payload wire types.
//!
//! The collector's wire format uses PascalCase field names. Session custom
//! data travels as-is under `UserCustomData`; breadcrumb and user
//! `custom_data` maps are renamed `CustomData` without touching their inner
//! keys. This is a presentation rule only — the in-memory model in
//! `session`/`breadcrumb`/`user` stays snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::breadcrumb::Breadcrumb;
use crate::frame::StackFrame;
use crate::user::User;

/// An immutable crash report, frozen before the pre-send filter sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CrashReportPayload {
	pub occurred_on: DateTime<Utc>,
	pub details: PayloadDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadDetails {
	pub error: ErrorDetails,
	pub environment: EnvironmentDetails,
	pub client: ClientDetails,
	/// Session custom data, keys preserved as-is.
	pub user_custom_data: Map<String, Value>,
	/// Session tags in insertion order.
	pub tags: Vec<String>,
	pub user: PayloadUser,
	pub breadcrumbs: Vec<PayloadBreadcrumb>,
	/// Application version, `"Not supplied"` when not configured.
	pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetails {
	pub class_name: String,
	pub message: String,
	pub stack_trace: Vec<PayloadFrame>,
	pub stack_string: String,
}

/// A normalized stack frame in wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadFrame {
	pub file_name: String,
	pub method_name: String,
	pub line_number: u32,
	pub column_number: u32,
	/// Position summary, `"line L, column C"`.
	pub class_name: String,
}

impl From<&StackFrame> for PayloadFrame {
	fn from(frame: &StackFrame) -> Self {
		let line = frame.line_number.unwrap_or(0);
		let column = frame.column_number.unwrap_or(0);
		let method_name = if frame.method_name.is_empty() {
			"[anonymous]".to_string()
		} else {
			frame.method_name.clone()
		};
		Self {
			file_name: frame.file.clone(),
			method_name,
			line_number: line,
			column_number: column,
			class_name: format!("line {line}, column {column}"),
		}
	}
}

/// Best-effort environment metadata plus fixed client-side fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentDetails {
	/// Hours behind UTC, positive to the west of it.
	pub utc_offset: f64,
	pub jail_broken: bool,
	/// Whatever the native capability reported, merged verbatim.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl EnvironmentDetails {
	pub fn new(utc_offset: f64, extra: Map<String, Value>) -> Self {
		Self {
			utc_offset,
			jail_broken: false,
			extra,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientDetails {
	/// SDK identifier, e.g. `cinder-telemetry.linux`.
	pub name: String,
	/// SDK crate version.
	pub version: String,
}

/// User record in wire format (capitalized keys).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadUser {
	pub identifier: String,
	pub is_anonymous: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub full_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
}

impl From<&User> for PayloadUser {
	fn from(user: &User) -> Self {
		Self {
			identifier: user.identifier.clone(),
			is_anonymous: user.is_anonymous,
			full_name: user.full_name.clone(),
			first_name: user.first_name.clone(),
			email: user.email.clone(),
		}
	}
}

/// Breadcrumb in wire format (capitalized keys, inner custom data as-is).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PayloadBreadcrumb {
	pub message: String,
	pub category: String,
	pub level: String,
	pub custom_data: Map<String, Value>,
	pub timestamp: i64,
}

impl From<&Breadcrumb> for PayloadBreadcrumb {
	fn from(crumb: &Breadcrumb) -> Self {
		Self {
			message: crumb.message.clone(),
			category: crumb.category.clone(),
			level: crumb.level.to_string(),
			custom_data: crumb.custom_data.clone(),
			timestamp: crumb.timestamp,
		}
	}
}
