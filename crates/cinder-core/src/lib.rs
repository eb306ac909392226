// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Cinder crash and session telemetry pipeline.
//!
//! This crate provides the shared data model used by the client SDK
//! (`cinder-telemetry`): sessions, users, breadcrumbs, stack frames, the
//! crash report wire payload, and RUM timing events. It performs no I/O.
//!
//! # Overview
//!
//! - A [`Session`] carries the mutable context (user, tags, custom data,
//!   breadcrumbs) attached to every report until cleared.
//! - A [`CapturedError`] plus normalized [`StackFrame`]s and a session
//!   snapshot combine into an immutable [`CrashReportPayload`].
//! - [`RumTimingEvent`]s are transient timing samples sharing only the
//!   session's user identity.

pub mod breadcrumb;
pub mod error;
pub mod frame;
pub mod payload;
pub mod rum;
pub mod session;
pub mod user;

pub use breadcrumb::{Breadcrumb, BreadcrumbLevel, BreadcrumbOptions};
pub use error::{CoreError, Result};
pub use frame::{CapturedError, StackFrame};
pub use payload::{
	ClientDetails, CrashReportPayload, EnvironmentDetails, ErrorDetails, PayloadBreadcrumb,
	PayloadDetails, PayloadFrame, PayloadUser,
};
pub use rum::{RumEventType, RumTimingEvent};
pub use session::Session;
pub use user::{User, UserSpec};
