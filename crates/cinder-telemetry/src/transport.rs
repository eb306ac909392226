// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport to the ingestion endpoint.

use async_trait::async_trait;
use tracing::debug;

use cinder_common_http::RetryConfig;

use crate::error::{Result, TelemetryError};

/// Default ingestion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.cinder.io";

/// Request timeout for report submission.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Remote collector endpoint abstraction. Implementations submit one
/// serialized crash report body per call.
#[async_trait]
pub trait RemoteCollector: Send + Sync {
	async fn submit(&self, api_key: &str, body: &str) -> Result<()>;
}

/// Collector backed by the HTTP ingestion API: POSTs each report to
/// `/entries` with the API key as a query parameter, retrying transient
/// failures with backoff.
pub struct HttpCollector {
	client: reqwest::Client,
	base_url: String,
	retry: RetryConfig,
}

impl HttpCollector {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			client: cinder_common_http::new_client_with_timeout(REQUEST_TIMEOUT),
			base_url: base_url.into().trim_end_matches('/').to_string(),
			retry: RetryConfig::default(),
		}
	}

	pub fn with_retry(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	async fn post_once(&self, api_key: &str, body: &str) -> Result<()> {
		let url = format!("{}/entries?apikey={}", self.base_url, api_key);
		let response = self
			.client
			.post(&url)
			.header("Content-Type", "application/json")
			.body(body.to_string())
			.send()
			.await?;

		let status = response.status();
		if status.is_success() {
			debug!(status = %status, "Report accepted");
			return Ok(());
		}

		let message = response.text().await.unwrap_or_default();
		Err(TelemetryError::ServerError {
			status: status.as_u16(),
			message: truncate_message(&message),
		})
	}
}

impl Default for HttpCollector {
	fn default() -> Self {
		Self::new(DEFAULT_ENDPOINT)
	}
}

#[async_trait]
impl RemoteCollector for HttpCollector {
	async fn submit(&self, api_key: &str, body: &str) -> Result<()> {
		cinder_common_http::retry(&self.retry, || self.post_once(api_key, body)).await
	}
}

fn truncate_message(message: &str) -> String {
	const MAX_LEN: usize = 512;
	if message.len() <= MAX_LEN {
		message.to_string()
	} else {
		let mut end = MAX_LEN;
		while !message.is_char_boundary(end) {
			end -= 1;
		}
		message[..end].to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use wiremock::matchers::{body_string_contains, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn no_retry() -> RetryConfig {
		RetryConfig {
			max_attempts: 1,
			..RetryConfig::default()
		}
	}

	#[tokio::test]
	async fn submits_to_entries_with_api_key_query_param() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/entries"))
			.and(query_param("apikey", "key-123"))
			.and(body_string_contains("OccurredOn"))
			.respond_with(ResponseTemplate::new(202))
			.expect(1)
			.mount(&server)
			.await;

		let collector = HttpCollector::new(server.uri()).with_retry(no_retry());
		collector
			.submit("key-123", r#"{"OccurredOn":"2025-01-01T00:00:00Z"}"#)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn non_success_status_is_an_error() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/entries"))
			.respond_with(ResponseTemplate::new(403).set_body_string("invalid api key"))
			.mount(&server)
			.await;

		let collector = HttpCollector::new(server.uri()).with_retry(no_retry());
		let err = collector.submit("bad-key", "{}").await.unwrap_err();
		match err {
			TelemetryError::ServerError { status, message } => {
				assert_eq!(status, 403);
				assert_eq!(message, "invalid api key");
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[tokio::test]
	async fn retries_transient_server_errors() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/entries"))
			.respond_with(ResponseTemplate::new(503))
			.up_to_n_times(1)
			.expect(1)
			.mount(&server)
			.await;
		Mock::given(method("POST"))
			.and(path("/entries"))
			.respond_with(ResponseTemplate::new(202))
			.expect(1)
			.mount(&server)
			.await;

		let retry = RetryConfig {
			max_attempts: 2,
			initial_backoff: std::time::Duration::from_millis(1),
			max_backoff: std::time::Duration::from_millis(2),
		};
		let collector = HttpCollector::new(server.uri()).with_retry(retry);
		collector.submit("key-123", "{}").await.unwrap();
	}

	#[tokio::test]
	async fn trailing_slash_in_base_url_is_trimmed() {
		let collector = HttpCollector::new("https://api.cinder.io/");
		assert_eq!(collector.base_url, "https://api.cinder.io");
	}
}
