// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end capture demo: initialize the client, build up session
//! context, and report a handled error.
//!
//! Run with:
//! ```sh
//! CINDER_API_KEY=your-key cargo run --example capture
//! ```

use std::sync::Arc;

use cinder_telemetry::{
	BreadcrumbOptions, CapturedError, ClientOptions, InitOutcome, StackFrame,
	TelemetryClientBuilder,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "cinder_telemetry=debug".into()),
		)
		.init();

	let api_key = std::env::var("CINDER_API_KEY")?;
	let options = ClientOptions::new(api_key)
		.with_version("0.1.0")
		.with_on_before_send(Arc::new(|payload| {
			// Suppress reports from debug-only error classes.
			payload.details.error.class_name != "DebugProbeError"
		}));

	let client = match TelemetryClientBuilder::new(options).init().await? {
		InitOutcome::Ready(client) => client,
		InitOutcome::AlreadyInitialized => {
			println!("already initialized by a previous run");
			return Ok(());
		}
	};

	client.set_user("demo-user");
	client.add_tag("example");
	client.record_breadcrumb("opened checkout screen", BreadcrumbOptions::default());

	let error = CapturedError::new("CheckoutError", "payment provider timed out").with_frames(vec![
		StackFrame::new("src/checkout.js", "submitPayment").at(42, 9),
		StackFrame::new("src/app.js", "main").at(7, 1),
	]);
	client.process_error(&error, false).await;

	// Give the background delivery a moment before the process exits.
	let delivered = client.flush_cached().await?;
	println!("flushed {delivered} previously cached report(s)");

	Ok(())
}
