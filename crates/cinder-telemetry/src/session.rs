// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The session store: synchronous, in-memory mutation of the current session.
//!
//! All operations are synchronous and non-blocking; captures racing through
//! the pipeline each read a consistent [`Session`] snapshot because the
//! snapshot itself is taken under the lock between suspension points.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::{Map, Value};

use cinder_core::{Breadcrumb, BreadcrumbOptions, Session, User, UserSpec};

/// Owns the single active [`Session`].
///
/// References handed out by [`snapshot`](SessionStore::snapshot) are
/// point-in-time copies, not live views; [`clear`](SessionStore::clear)
/// atomically replaces the whole session.
pub struct SessionStore {
	device_id: String,
	inner: Mutex<Session>,
}

impl SessionStore {
	/// Creates a store with a fresh default session: anonymous device-based
	/// user, empty collections.
	pub fn new(device_id: impl Into<String>) -> Self {
		let device_id = device_id.into();
		let session = Session::new(User::anonymous(&device_id));
		Self {
			device_id,
			inner: Mutex::new(session),
		}
	}

	// A poisoned lock still holds a structurally valid session; telemetry
	// must not take the host down over it.
	fn lock(&self) -> MutexGuard<'_, Session> {
		self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn device_id(&self) -> &str {
		&self.device_id
	}

	/// Adds tags, enforcing set semantics and preserving insertion order.
	/// Returns the full tag set after insertion (for native mirroring).
	pub fn add_tags<I, S>(&self, tags: I) -> Vec<String>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut session = self.lock();
		for tag in tags {
			session.add_tag(tag);
		}
		session.tags.clone()
	}

	/// Replaces the session user. An empty identifier yields a fresh
	/// anonymous identity rather than an empty-identifier user, so an unset
	/// identity is never indistinguishable from a blank one. Returns the
	/// resulting user.
	pub fn set_user(&self, spec: impl Into<UserSpec>) -> User {
		let user = match spec.into() {
			UserSpec::Identifier(id) if id.is_empty() => User::fresh_anonymous(&self.device_id),
			UserSpec::Identifier(id) => User::identified(id),
			UserSpec::Record(record) if record.identifier.is_empty() => {
				User::fresh_anonymous(&self.device_id)
			}
			UserSpec::Record(record) => record,
		};
		self.lock().user = user.clone();
		user
	}

	/// Shallow-merges a patch into the custom data; returns the merged map.
	pub fn add_custom_data(&self, patch: Map<String, Value>) -> Map<String, Value> {
		let mut session = self.lock();
		session.merge_custom_data(patch);
		session.custom_data.clone()
	}

	/// Functionally replaces the custom data; returns the new map.
	pub fn update_custom_data<F>(&self, updater: F) -> Map<String, Value>
	where
		F: FnOnce(Map<String, Value>) -> Map<String, Value>,
	{
		let mut session = self.lock();
		let updated = updater(std::mem::take(&mut session.custom_data));
		session.custom_data = updated;
		session.custom_data.clone()
	}

	/// Records a breadcrumb, stamping the timestamp at call time regardless
	/// of caller input. Returns the stored breadcrumb (for native mirroring).
	pub fn record_breadcrumb(
		&self,
		message: impl Into<String>,
		options: BreadcrumbOptions,
	) -> Breadcrumb {
		let breadcrumb = Breadcrumb::new(message, options, Utc::now().timestamp_millis());
		self.lock().push_breadcrumb(breadcrumb.clone());
		breadcrumb
	}

	/// Atomically replaces the session with a fresh default: new anonymous
	/// user, empty collections.
	pub fn clear(&self) {
		*self.lock() = Session::new(User::anonymous(&self.device_id));
	}

	pub fn current_user(&self) -> User {
		self.lock().user.clone()
	}

	/// A consistent point-in-time copy of the session.
	pub fn snapshot(&self) -> Session {
		self.lock().clone()
	}
}
