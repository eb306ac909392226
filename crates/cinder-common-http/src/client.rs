// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Construction of [`reqwest::Client`]s carrying the shared Cinder
//! User-Agent, `cinder/{os}/{crate version}`. The telemetry collector
//! builds its client through [`new_client_with_timeout`] so every report
//! submission is bounded; [`builder`] is the escape hatch for callers
//! needing proxies, extra headers, or other knobs on top.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

/// The User-Agent sent on every request, e.g. `cinder/linux/0.1.0`.
pub fn user_agent() -> String {
	format!("cinder/{}/{}", std::env::consts::OS, env!("CARGO_PKG_VERSION"))
}

/// A [`ClientBuilder`] pre-populated with the shared User-Agent.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// A client with the shared User-Agent and reqwest defaults, notably no
/// request timeout. Prefer [`new_client_with_timeout`] for anything that
/// talks to a collector.
pub fn new_client() -> Client {
	builder().build().expect("default client configuration is valid")
}

/// A client with the shared User-Agent and a total-request timeout that
/// covers connect, send, and body read.
pub fn new_client_with_timeout(timeout: Duration) -> Client {
	builder()
		.timeout(timeout)
		.build()
		.expect("default client configuration is valid")
}
