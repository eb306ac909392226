// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The in-memory session: user, tags, custom data and breadcrumbs attached
//! to every report until the session is cleared.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::breadcrumb::Breadcrumb;
use crate::user::User;

/// Process-wide mutable telemetry context. One active instance at a time;
/// never persisted — recreated from the device-based anonymous identity on
/// restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	/// Ordered set: uniqueness enforced on insert, insertion order preserved
	/// for serialization.
	pub tags: Vec<String>,
	pub custom_data: Map<String, Value>,
	/// Append-only, oldest first.
	pub breadcrumbs: Vec<Breadcrumb>,
	pub user: User,
}

impl Session {
	/// A fresh session with empty collections for the given user.
	pub fn new(user: User) -> Self {
		Self {
			tags: Vec::new(),
			custom_data: Map::new(),
			breadcrumbs: Vec::new(),
			user,
		}
	}

	/// Adds a tag, preserving insertion order. Re-adding an existing tag is
	/// a no-op; returns whether the tag was newly inserted.
	pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
		let tag = tag.into();
		if self.tags.iter().any(|t| *t == tag) {
			return false;
		}
		self.tags.push(tag);
		true
	}

	/// Shallow-merges a patch into the custom data, last write wins.
	pub fn merge_custom_data(&mut self, patch: Map<String, Value>) {
		for (key, value) in patch {
			self.custom_data.insert(key, value);
		}
	}

	pub fn push_breadcrumb(&mut self, breadcrumb: Breadcrumb) {
		self.breadcrumbs.push(breadcrumb);
	}
}
