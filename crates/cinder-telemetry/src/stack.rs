// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack normalization: turning a raw captured stack into a cleaned,
//! device-independent frame sequence.
//!
//! Two resolver variants exist, selected once at build time:
//! - [`SymbolicatingResolver`] delegates to a development-time
//!   [`Symbolicator`] and uses its frames verbatim.
//! - [`HeuristicCleanupResolver`] is the production path: it drops internal
//!   runtime noise frames, strips the `"(address at ...)"` suffix the stack
//!   parser appends to method names, and rewrites on-device absolute bundle
//!   paths to a canonical pseudo source-map URL so the same payload is
//!   stable across devices and builds.
//!
//! Resolvers never fail: malformed or missing stack data degrades to an
//! empty frame sequence rather than aborting the capture.

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use cinder_core::{CapturedError, StackFrame};

use crate::error::Result;

/// Canonical prefix substituted for on-device bundle paths.
pub const SOURCE_MAP_PREFIX: &str = "file://cinder.local/";

/// Absolute on-device bundle paths: an optional `name@` prefix, a container
/// directory ending in `.app` or a code-push segment, then the relative file.
const DEVICE_PATH_PATTERN: &str = r"^(.*@)?.*/[^.]+(\.app|CodePush)/?(.*)$";

/// Rendering and message-dispatch internals of the host runtime; frames from
/// these files carry no information about application code.
const INTERNAL_RUNTIME_PATTERN: &str = r"Renderer-dev\.js$|MessageQueue\.js$|native\scode";

/// Converts a raw captured error into an ordered, cleaned frame sequence.
pub trait StackResolver: Send + Sync {
	fn resolve(&self, error: &CapturedError) -> Vec<StackFrame>;
}

/// Development-time source-map symbolication collaborator.
pub trait Symbolicator: Send + Sync {
	fn symbolicate(&self, frames: &[StackFrame]) -> Result<Vec<StackFrame>>;
}

/// Delegates to a [`Symbolicator`] and uses its frame list verbatim.
pub struct SymbolicatingResolver {
	symbolicator: Arc<dyn Symbolicator>,
}

impl SymbolicatingResolver {
	pub fn new(symbolicator: Arc<dyn Symbolicator>) -> Self {
		Self { symbolicator }
	}
}

impl StackResolver for SymbolicatingResolver {
	fn resolve(&self, error: &CapturedError) -> Vec<StackFrame> {
		if !error.has_stack() {
			return Vec::new();
		}
		match self.symbolicator.symbolicate(&error.frames) {
			Ok(frames) => frames,
			Err(e) => {
				warn!(error = %e, "Symbolication failed; continuing without stack frames");
				Vec::new()
			}
		}
	}
}

/// Production cleanup: noise filtering, address-suffix stripping, and
/// device-path rewriting applied to every frame.
pub struct HeuristicCleanupResolver {
	device_path: Regex,
	internal_runtime: Regex,
}

impl HeuristicCleanupResolver {
	pub fn new() -> Self {
		Self {
			device_path: Regex::new(DEVICE_PATH_PATTERN).expect("device path pattern is valid"),
			internal_runtime: Regex::new(INTERNAL_RUNTIME_PATTERN)
				.expect("internal runtime pattern is valid"),
		}
	}

	/// Whether a frame belongs to internal runtime files (or has no file at
	/// all) and should be excluded as noise.
	pub fn is_noise_frame(&self, frame: &StackFrame) -> bool {
		frame.file.is_empty() || self.internal_runtime.is_match(&frame.file)
	}

	/// Strips the `"(address at ...)"` suffix the stack parser appends to
	/// method names.
	pub fn strip_address_suffix(method_name: &str) -> String {
		match method_name.find("(address at") {
			Some(pos) => method_name[..pos].trim_end().to_string(),
			None => method_name.to_string(),
		}
	}

	/// Rewrites an on-device absolute bundle path to the canonical pseudo
	/// source-map URL plus the relative file name. Paths that do not match
	/// the device pattern pass through unchanged.
	pub fn rewrite_device_path(&self, file: &str) -> String {
		match self.device_path.captures(file) {
			Some(caps) => {
				let relative = caps.get(3).map_or("", |m| m.as_str());
				format!("{SOURCE_MAP_PREFIX}{relative}")
			}
			None => file.to_string(),
		}
	}

	fn clean(&self, frame: &StackFrame) -> StackFrame {
		StackFrame {
			file: self.rewrite_device_path(&frame.file),
			method_name: Self::strip_address_suffix(&frame.method_name),
			line_number: frame.line_number,
			column_number: frame.column_number,
		}
	}
}

impl Default for HeuristicCleanupResolver {
	fn default() -> Self {
		Self::new()
	}
}

impl StackResolver for HeuristicCleanupResolver {
	fn resolve(&self, error: &CapturedError) -> Vec<StackFrame> {
		error
			.frames
			.iter()
			.filter(|frame| !self.is_noise_frame(frame))
			.map(|frame| self.clean(frame))
			.collect()
	}
}
