// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack frames and the captured-error input to the pipeline.

use serde::{Deserialize, Serialize};

/// A single stack frame as parsed from a raw platform stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
	/// Source file path or bundle URL.
	pub file: String,
	pub method_name: String,
	pub line_number: Option<u32>,
	pub column_number: Option<u32>,
}

impl StackFrame {
	pub fn new(file: impl Into<String>, method_name: impl Into<String>) -> Self {
		Self {
			file: file.into(),
			method_name: method_name.into(),
			line_number: None,
			column_number: None,
		}
	}

	pub fn at(mut self, line: u32, column: u32) -> Self {
		self.line_number = Some(line);
		self.column_number = Some(column);
		self
	}
}

/// An error as captured by a global hook, before normalization.
///
/// `frames` holds the raw parsed stack; an empty list means the error had no
/// usable stack data and the capture will be dropped.
#[derive(Debug, Clone)]
pub struct CapturedError {
	/// Error class name, e.g. "TypeError" or a Rust error type path.
	pub class_name: String,
	pub message: String,
	/// Raw string representation of the error.
	pub stack_string: String,
	pub frames: Vec<StackFrame>,
}

impl CapturedError {
	pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
		let class_name = class_name.into();
		let message = message.into();
		let stack_string = format!("{class_name}: {message}");
		Self {
			class_name,
			message,
			stack_string,
			frames: Vec::new(),
		}
	}

	pub fn with_frames(mut self, frames: Vec<StackFrame>) -> Self {
		self.frames = frames;
		self
	}

	/// Whether the error carries usable stack data.
	pub fn has_stack(&self) -> bool {
		!self.frames.is_empty()
	}
}
