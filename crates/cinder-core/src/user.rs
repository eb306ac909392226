// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity attached to a session and its crash reports.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The user a session belongs to.
///
/// `identifier` is never empty: an unset or empty identity is replaced by a
/// synthesized anonymous one so it stays distinguishable from a real user
/// with an accidentally blank identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub identifier: String,
	pub is_anonymous: bool,
	pub full_name: Option<String>,
	pub first_name: Option<String>,
	pub email: Option<String>,
}

impl User {
	/// A user with a caller-supplied identifier.
	pub fn identified(identifier: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			is_anonymous: false,
			full_name: None,
			first_name: None,
			email: None,
		}
	}

	/// The default anonymous identity derived from the stable per-device
	/// identifier. Stable across restarts on the same device.
	pub fn anonymous(device_id: &str) -> Self {
		Self {
			identifier: format!("anonymous-{device_id}"),
			is_anonymous: true,
			full_name: None,
			first_name: None,
			email: None,
		}
	}

	/// A fresh anonymous identity: device id plus time and random suffixes,
	/// so an explicit reset is distinguishable from the default identity.
	pub fn fresh_anonymous(device_id: &str) -> Self {
		let millis = Utc::now().timestamp_millis();
		let nonce = fastrand::u32(..);
		Self {
			identifier: format!("{device_id}-{millis:x}-{nonce:x}"),
			is_anonymous: true,
			full_name: None,
			first_name: None,
			email: None,
		}
	}
}

/// Accepted inputs to `set_user`: a bare identifier or a full record.
#[derive(Debug, Clone)]
pub enum UserSpec {
	Identifier(String),
	Record(User),
}

impl From<&str> for UserSpec {
	fn from(identifier: &str) -> Self {
		Self::Identifier(identifier.to_string())
	}
}

impl From<String> for UserSpec {
	fn from(identifier: String) -> Self {
		Self::Identifier(identifier)
	}
}

impl From<User> for UserSpec {
	fn from(user: User) -> Self {
		Self::Record(user)
	}
}
