// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry SDK.

use cinder_common_http::RetryableError;
use thiserror::Error;

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur in the telemetry SDK.
///
/// Only configuration errors ever reach the host application; everything on
/// the capture path is logged and degraded instead.
#[derive(Debug, Error)]
pub enum TelemetryError {
	/// RUM was requested but the native capability is not configured.
	#[error("cannot enable RUM: native capability is not configured")]
	RumRequiresNative,

	/// An API key is required for any delivery.
	#[error("API key is required")]
	MissingApiKey,

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error (status {status}): {message}")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Error message from server.
		message: String,
	},

	/// Development-time symbolication failed.
	#[error("symbolication failed: {0}")]
	Symbolication(String),

	/// Durable report cache I/O failed.
	#[error("report cache I/O failed: {0}")]
	CacheIo(#[from] std::io::Error),

	/// Failed to serialize a payload or cache entry.
	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl RetryableError for TelemetryError {
	fn is_retryable(&self) -> bool {
		match self {
			TelemetryError::RequestFailed(e) => e.is_retryable(),
			TelemetryError::ServerError { status, .. } => {
				matches!(*status, 408 | 429 | 500 | 502 | 503 | 504)
			}
			_ => false,
		}
	}
}
