// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook integration: automatic capture of unhandled panics.

use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;

use tokio::runtime::Handle;
use tracing::debug;

use cinder_core::{CapturedError, StackFrame};

use crate::backtrace::parse_backtrace;
use crate::client::TelemetryClient;

/// Installs a hook that routes unhandled panics through the capture
/// pipeline, then defers to the previously installed hook.
pub(crate) fn install_panic_hook(client: TelemetryClient, handle: Handle) {
	let previous_hook = std::panic::take_hook();

	std::panic::set_hook(Box::new(move |info| {
		// Capture on the panicking thread, before anything unwinds.
		let backtrace = Backtrace::force_capture();
		report_panic(&client, &handle, info, &backtrace);
		previous_hook(info);
	}));
	debug!("Panic hook installed");
}

fn report_panic(
	client: &TelemetryClient,
	handle: &Handle,
	info: &PanicHookInfo<'_>,
	backtrace: &Backtrace,
) {
	let message = extract_panic_message(info);

	let mut frames = parse_backtrace(backtrace);
	if frames.is_empty() {
		// Stripped builds may yield no parseable frames; the panic site
		// still locates the report.
		if let Some(location) = info.location() {
			frames.push(
				StackFrame::new(location.file(), "[anonymous]")
					.at(location.line(), location.column()),
			);
		}
	}
	let error = CapturedError::new("panic", message).with_frames(frames);

	// The panicking thread cannot await; hand the report to the runtime.
	let client = client.clone();
	handle.spawn(async move {
		client.process_error(&error, true).await;
	});
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
	if let Some(s) = info.payload().downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = info.payload().downcast_ref::<String>() {
		s.clone()
	} else {
		"Box<dyn Any>".to_string()
	}
}
