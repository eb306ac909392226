// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Backtrace capture and parsing for Rust hosts.
//!
//! Turns `std::backtrace::Backtrace` output into the pipeline's raw
//! [`StackFrame`]s so Rust errors can enter the same capture path as
//! platform-captured ones.

use std::backtrace::Backtrace;

use cinder_core::{CapturedError, StackFrame};

/// Captures a fresh backtrace and parses it, dropping runtime plumbing.
pub fn capture_frames() -> Vec<StackFrame> {
	let backtrace = Backtrace::force_capture();
	parse_backtrace(&backtrace)
}

/// Builds a [`CapturedError`] from any error plus a freshly captured
/// backtrace.
pub fn capture_error<E: std::error::Error>(error: &E) -> CapturedError {
	CapturedError::new(std::any::type_name::<E>(), error.to_string()).with_frames(capture_frames())
}

/// Parses a Rust backtrace into raw stack frames.
pub fn parse_backtrace(backtrace: &Backtrace) -> Vec<StackFrame> {
	parse_backtrace_string(&backtrace.to_string())
}

fn parse_backtrace_string(bt_string: &str) -> Vec<StackFrame> {
	let mut frames: Vec<StackFrame> = Vec::new();
	// Whether the most recent frame line was kept. Location lines following
	// a dropped runtime frame belong to that frame, not the last kept one.
	let mut last_kept = false;

	for line in bt_string.lines() {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		// Location lines ("at path:line:col") describe the preceding frame.
		if let Some(location) = line.strip_prefix("at ") {
			if last_kept {
				if let Some(frame) = frames.last_mut() {
					apply_location(frame, location);
				}
			}
			continue;
		}

		if let Some(symbol) = parse_frame_line(line) {
			if is_runtime_frame(&symbol) {
				last_kept = false;
				continue;
			}
			frames.push(StackFrame::new("", symbol));
			last_kept = true;
		}
	}

	frames
}

/// Extracts the symbol from a frame line, stripping the `"  N: "` prefix.
fn parse_frame_line(line: &str) -> Option<String> {
	let symbol = match line.find(':') {
		Some(idx) if line[..idx].trim().parse::<u32>().is_ok() => line[idx + 1..].trim(),
		_ => line,
	};
	if symbol.is_empty() {
		None
	} else {
		Some(symbol.to_string())
	}
}

fn apply_location(frame: &mut StackFrame, location: &str) {
	// path:line:col, where the path itself may contain colons on Windows.
	let mut parts = location.rsplitn(3, ':');
	let col = parts.next().and_then(|s| s.parse::<u32>().ok());
	let line = parts.next().and_then(|s| s.parse::<u32>().ok());
	let file = parts.next().unwrap_or(location);

	match (line, col) {
		(Some(line), Some(col)) => {
			frame.file = file.to_string();
			frame.line_number = Some(line);
			frame.column_number = Some(col);
		}
		_ => {
			frame.file = location.to_string();
		}
	}
}

/// Whether a symbol belongs to runtime/panic plumbing rather than
/// application code.
fn is_runtime_frame(symbol: &str) -> bool {
	const RUNTIME_PREFIXES: &[&str] = &[
		"std::",
		"core::",
		"alloc::",
		"<std::",
		"<core::",
		"<alloc::",
		"tokio::",
		"<tokio::",
		"backtrace::",
		"<backtrace::",
		"panic_unwind::",
		"rust_begin_unwind",
		"rust_panic",
		"__rust_",
		"_rust_",
	];

	const RUNTIME_CONTAINS: &[&str] = &[
		"::panic::",
		"::panicking::",
		"::thread::",
		"::rt::",
		"::runtime::",
		"::sys_common::",
	];

	RUNTIME_PREFIXES.iter().any(|p| symbol.starts_with(p))
		|| RUNTIME_CONTAINS.iter().any(|c| symbol.contains(c))
}
