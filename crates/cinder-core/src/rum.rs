// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Real-user-monitoring timing events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The kind of timing being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RumEventType {
	ActivityLoaded,
	NetworkCall,
}

impl fmt::Display for RumEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::ActivityLoaded => write!(f, "activity_loaded"),
			Self::NetworkCall => write!(f, "network_call"),
		}
	}
}

impl FromStr for RumEventType {
	type Err = CoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"activity_loaded" => Ok(Self::ActivityLoaded),
			"network_call" => Ok(Self::NetworkCall),
			_ => Err(CoreError::InvalidRumEventType(s.to_string())),
		}
	}
}

/// A timing sample, built and sent immediately — never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RumTimingEvent {
	pub event_type: RumEventType,
	pub name: String,
	pub duration_ms: f64,
	pub user_identifier: String,
}

impl RumTimingEvent {
	/// Builds a timing event; negative durations clamp to zero.
	pub fn new(
		event_type: RumEventType,
		name: impl Into<String>,
		duration_ms: f64,
		user_identifier: impl Into<String>,
	) -> Self {
		Self {
			event_type,
			name: name.into(),
			duration_ms: duration_ms.max(0.0),
			user_identifier: user_identifier.into(),
		}
	}
}
