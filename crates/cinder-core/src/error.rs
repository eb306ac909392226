// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Cinder core data model.

use thiserror::Error;

/// Errors that can occur in the core telemetry data model.
#[derive(Debug, Error)]
pub enum CoreError {
	#[error("invalid breadcrumb level: {0}")]
	InvalidBreadcrumbLevel(String),

	#[error("invalid RUM event type: {0}")]
	InvalidRumEventType(String),

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result type for core data model operations.
pub type Result<T> = std::result::Result<T, CoreError>;
