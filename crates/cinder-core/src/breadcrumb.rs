// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Breadcrumb types: timestamped contextual markers recorded before an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A point-in-time marker recorded during a session.
///
/// Breadcrumbs are append-only and immutable once recorded. The `timestamp`
/// is stamped at record time by the session store, never caller-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
	pub message: String,
	/// "http", "navigation", "ui", "console"
	pub category: String,
	pub level: BreadcrumbLevel,
	pub custom_data: Map<String, Value>,
	/// Milliseconds since the Unix epoch, assigned at record time.
	pub timestamp: i64,
}

impl Breadcrumb {
	/// Builds a breadcrumb from a message and caller overrides, stamping the
	/// given timestamp. Missing fields take their defaults before overrides
	/// are applied.
	pub fn new(message: impl Into<String>, options: BreadcrumbOptions, timestamp: i64) -> Self {
		Self {
			message: message.into(),
			category: options.category.unwrap_or_default(),
			level: options.level.unwrap_or_default(),
			custom_data: options.custom_data.unwrap_or_default(),
			timestamp,
		}
	}
}

/// Caller-supplied overrides for `record_breadcrumb`.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbOptions {
	pub category: Option<String>,
	pub level: Option<BreadcrumbLevel>,
	pub custom_data: Option<Map<String, Value>>,
}

/// Severity level of a breadcrumb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreadcrumbLevel {
	Debug,
	#[default]
	Info,
	Warning,
	Error,
}

impl fmt::Display for BreadcrumbLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Debug => write!(f, "debug"),
			Self::Info => write!(f, "info"),
			Self::Warning => write!(f, "warning"),
			Self::Error => write!(f, "error"),
		}
	}
}

impl FromStr for BreadcrumbLevel {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"debug" => Ok(Self::Debug),
			"info" => Ok(Self::Info),
			"warning" => Ok(Self::Warning),
			"error" => Ok(Self::Error),
			_ => Err(CoreError::InvalidBreadcrumbLevel(s.to_string())),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn new_applies_defaults_before_overrides() {
		let crumb = Breadcrumb::new("clicked checkout", BreadcrumbOptions::default(), 1_700_000_000_000);
		assert_eq!(crumb.message, "clicked checkout");
		assert_eq!(crumb.category, "");
		assert_eq!(crumb.level, BreadcrumbLevel::Info);
		assert!(crumb.custom_data.is_empty());
		assert_eq!(crumb.timestamp, 1_700_000_000_000);
	}

	#[test]
	fn new_keeps_caller_overrides() {
		let mut data = Map::new();
		data.insert("status".to_string(), serde_json::json!(500));
		let crumb = Breadcrumb::new(
			"request failed",
			BreadcrumbOptions {
				category: Some("http".to_string()),
				level: Some(BreadcrumbLevel::Error),
				custom_data: Some(data),
			},
			42,
		);
		assert_eq!(crumb.category, "http");
		assert_eq!(crumb.level, BreadcrumbLevel::Error);
		assert_eq!(crumb.custom_data["status"], serde_json::json!(500));
	}

	proptest! {
		#[test]
		fn breadcrumb_level_roundtrip(level in prop_oneof![
			Just(BreadcrumbLevel::Debug),
			Just(BreadcrumbLevel::Info),
			Just(BreadcrumbLevel::Warning),
			Just(BreadcrumbLevel::Error),
		]) {
			let s = level.to_string();
			let parsed: BreadcrumbLevel = s.parse().unwrap();
			prop_assert_eq!(level, parsed);
		}
	}
}
