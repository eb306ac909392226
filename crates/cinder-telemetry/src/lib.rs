// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side crash and session telemetry pipeline.
//!
//! The pipeline captures errors, normalizes their stacks, attaches the
//! current session context (tags, custom data, breadcrumbs, user identity),
//! and delivers the resulting report to the ingestion endpoint with a
//! durable store-and-forward fallback.
//!
//! # Quick start
//!
//! ```no_run
//! use cinder_telemetry::{ClientOptions, InitOutcome, TelemetryClientBuilder};
//!
//! # async fn run() -> cinder_telemetry::Result<()> {
//! let options = ClientOptions::new("your-api-key").with_version("1.2.3");
//! let client = match TelemetryClientBuilder::new(options).init().await? {
//! 	InitOutcome::Ready(client) => client,
//! 	InitOutcome::AlreadyInitialized => return Ok(()),
//! };
//!
//! client.set_user("user-42");
//! client.add_tag("checkout");
//! # Ok(())
//! # }
//! ```

pub mod backtrace;
pub mod cache;
pub mod client;
pub mod config;
pub mod delivery;
pub mod error;
pub mod hooks;
pub mod native;
mod panic_hook;
pub mod payload;
pub mod rum;
pub mod session;
pub mod stack;
pub mod transport;

pub use cache::{CacheEntry, CachedReport, ReportCache, DEFAULT_MAX_ENTRIES};
pub use client::{InitOutcome, TelemetryClient, TelemetryClientBuilder};
pub use config::{ClientOptions, OnBeforeSend};
pub use delivery::{Delivery, DeliveryConfig};
pub use error::{Result, TelemetryError};
pub use hooks::{ErrorHandler, HandlerChain};
pub use native::{NativeCapability, NoNative};
pub use payload::PayloadBuilder;
pub use rum::{RealtimeMonitor, RumEmitter};
pub use session::SessionStore;
pub use stack::{
	HeuristicCleanupResolver, StackResolver, SymbolicatingResolver, Symbolicator,
	SOURCE_MAP_PREFIX,
};
pub use transport::{HttpCollector, RemoteCollector, DEFAULT_ENDPOINT};

// Re-exported so hosts rarely need a direct cinder-core dependency.
pub use cinder_core::{
	Breadcrumb, BreadcrumbLevel, BreadcrumbOptions, CapturedError, CrashReportPayload,
	RumEventType, RumTimingEvent, Session, StackFrame, User, UserSpec,
};
