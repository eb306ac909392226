// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The telemetry client: initialization and the capture pipeline.
//!
//! Initialization wires the session store, stack resolver, payload builder,
//! and delivery path together, then hands back a cheaply cloneable handle.
//! The capture path never surfaces errors to the host: every failure past
//! initialization is logged and degraded.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use cinder_core::{
	BreadcrumbOptions, CapturedError, RumEventType, RumTimingEvent, User, UserSpec,
};

use crate::cache::ReportCache;
use crate::config::ClientOptions;
use crate::delivery::{Delivery, DeliveryConfig};
use crate::error::{Result, TelemetryError};
use crate::hooks::{ErrorHandler, HandlerChain};
use crate::native::{NativeCapability, NoNative};
use crate::payload::PayloadBuilder;
use crate::rum::{RealtimeMonitor, RumEmitter};
use crate::session::SessionStore;
use crate::stack::{HeuristicCleanupResolver, StackResolver, SymbolicatingResolver, Symbolicator};
use crate::transport::{HttpCollector, RemoteCollector};

/// Tag attached to reports captured from fatal errors.
const FATAL_TAG: &str = "Fatal";

/// Outcome of [`TelemetryClientBuilder::init`].
pub enum InitOutcome {
	/// A previous run of the host already initialized the native module;
	/// no new client was constructed.
	AlreadyInitialized,
	Ready(TelemetryClient),
}

/// Builder for [`TelemetryClient`]. Collaborators not supplied fall back
/// to production defaults (no native module, HTTP collector, heuristic
/// stack cleanup, platform cache directory).
pub struct TelemetryClientBuilder {
	options: ClientOptions,
	native: Option<Arc<dyn NativeCapability>>,
	collector: Option<Arc<dyn RemoteCollector>>,
	monitor: Option<Arc<dyn RealtimeMonitor>>,
	symbolicator: Option<Arc<dyn Symbolicator>>,
	cache_dir: Option<PathBuf>,
	delivery_config: DeliveryConfig,
	capture_panics: bool,
}

impl TelemetryClientBuilder {
	pub fn new(options: ClientOptions) -> Self {
		Self {
			options,
			native: None,
			collector: None,
			monitor: None,
			symbolicator: None,
			cache_dir: None,
			delivery_config: DeliveryConfig::default(),
			capture_panics: true,
		}
	}

	pub fn with_native(mut self, native: Arc<dyn NativeCapability>) -> Self {
		self.native = Some(native);
		self
	}

	pub fn with_collector(mut self, collector: Arc<dyn RemoteCollector>) -> Self {
		self.collector = Some(collector);
		self
	}

	pub fn with_monitor(mut self, monitor: Arc<dyn RealtimeMonitor>) -> Self {
		self.monitor = Some(monitor);
		self
	}

	/// Routes stack resolution through a development-time symbolicator
	/// instead of the production heuristic cleanup.
	pub fn with_symbolicator(mut self, symbolicator: Arc<dyn Symbolicator>) -> Self {
		self.symbolicator = Some(symbolicator);
		self
	}

	pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.cache_dir = Some(dir.into());
		self
	}

	pub fn with_delivery_config(mut self, config: DeliveryConfig) -> Self {
		self.delivery_config = config;
		self
	}

	/// Whether init installs a process-global panic hook that reports
	/// unhandled panics as fatal errors. On by default; hosts embedding
	/// multiple clients in one process should disable all but one.
	pub fn with_panic_hook(mut self, capture_panics: bool) -> Self {
		self.capture_panics = capture_panics;
		self
	}

	/// Initializes the pipeline.
	///
	/// Fails only on configuration errors: a missing API key, or RUM
	/// requested without a usable native capability. Everything downstream
	/// degrades instead of failing.
	pub async fn init(self) -> Result<InitOutcome> {
		if self.options.api_key.is_empty() {
			return Err(TelemetryError::MissingApiKey);
		}

		let native: Arc<dyn NativeCapability> =
			self.native.unwrap_or_else(|| Arc::new(NoNative));
		let native_usable = (self.options.enable_native_crash_reporting
			|| self.options.enable_rum)
			&& native.is_available();

		if native_usable && native.has_initialized().await {
			info!("Native module already initialized; skipping");
			return Ok(InitOutcome::AlreadyInitialized);
		}

		let rum = if self.options.enable_rum {
			let monitor = match (&self.monitor, native.is_available()) {
				(Some(monitor), true) => Arc::clone(monitor),
				_ => return Err(TelemetryError::RumRequiresNative),
			};
			monitor.setup(
				&self.options.api_key,
				self.options.enable_network_monitoring,
				&self.options.ignore_urls,
			);
			RumEmitter::new(monitor)
		} else {
			RumEmitter::disabled()
		};

		if native_usable {
			native
				.init(&self.options.api_key, self.options.enable_rum, &self.options.version)
				.await;
		}

		let device_id = native
			.device_id()
			.unwrap_or_else(|| Uuid::new_v4().to_string());

		let resolver: Arc<dyn StackResolver> = match self.symbolicator {
			Some(symbolicator) => Arc::new(SymbolicatingResolver::new(symbolicator)),
			None => Arc::new(HeuristicCleanupResolver::new()),
		};

		let collector: Arc<dyn RemoteCollector> = self
			.collector
			.unwrap_or_else(|| Arc::new(HttpCollector::default()));
		let cache_dir = self.cache_dir.unwrap_or_else(ReportCache::default_dir);
		let flush_delay = self.delivery_config.flush_delay;
		let delivery = Arc::new(Delivery::new(
			collector,
			ReportCache::new(cache_dir),
			self.delivery_config,
		));

		let payload_builder = PayloadBuilder::new(Arc::clone(&native), self.options.version.clone());
		let client = TelemetryClient {
			inner: Arc::new(ClientInner {
				options: self.options,
				native,
				session: SessionStore::new(device_id),
				resolver,
				payload_builder,
				delivery,
				rum,
				error_chain: HandlerChain::new(),
				rejection_chain: HandlerChain::new(),
			}),
		};

		if self.capture_panics {
			crate::panic_hook::install_panic_hook(
				client.clone(),
				tokio::runtime::Handle::current(),
			);
		}

		// With no native transmission path, previously cached reports are
		// ours to replay shortly after startup.
		if !native_usable {
			let delivery = Arc::clone(&client.inner.delivery);
			let api_key = client.inner.options.api_key.clone();
			tokio::spawn(async move {
				tokio::time::sleep(flush_delay).await;
				if let Err(e) = delivery.flush_cached(&api_key).await {
					warn!(error = %e, "Startup flush of cached reports failed");
				}
			});
		}

		info!(
			native = native_usable,
			rum = client.inner.rum.is_enabled(),
			"Telemetry client initialized"
		);
		Ok(InitOutcome::Ready(client))
	}
}

struct ClientInner {
	options: ClientOptions,
	native: Arc<dyn NativeCapability>,
	session: SessionStore,
	resolver: Arc<dyn StackResolver>,
	payload_builder: PayloadBuilder,
	delivery: Arc<Delivery>,
	rum: RumEmitter,
	error_chain: HandlerChain,
	rejection_chain: HandlerChain,
}

/// Cloneable handle to the running pipeline.
#[derive(Clone)]
pub struct TelemetryClient {
	inner: Arc<ClientInner>,
}

impl TelemetryClient {
	/// Whether session mutations are mirrored to the native module.
	fn mirrors_to_native(&self) -> bool {
		self.inner.options.enable_native_crash_reporting && self.inner.native.is_available()
	}

	pub fn add_tag(&self, tag: impl Into<String>) {
		self.add_tags([tag.into()]);
	}

	pub fn add_tags<I, S>(&self, tags: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let all = self.inner.session.add_tags(tags);
		if self.mirrors_to_native() {
			self.inner.native.set_tags(&all);
		}
	}

	pub fn set_user(&self, spec: impl Into<UserSpec>) -> User {
		let user = self.inner.session.set_user(spec);
		if self.mirrors_to_native() {
			self.inner.native.set_user(&user);
		}
		user
	}

	pub fn add_custom_data(&self, patch: Map<String, Value>) {
		let merged = self.inner.session.add_custom_data(patch);
		if self.mirrors_to_native() {
			self.inner.native.set_custom_data(&merged);
		}
	}

	pub fn update_custom_data<F>(&self, updater: F)
	where
		F: FnOnce(Map<String, Value>) -> Map<String, Value>,
	{
		let updated = self.inner.session.update_custom_data(updater);
		if self.mirrors_to_native() {
			self.inner.native.set_custom_data(&updated);
		}
	}

	pub fn record_breadcrumb(&self, message: impl Into<String>, options: BreadcrumbOptions) {
		let breadcrumb = self.inner.session.record_breadcrumb(message, options);
		if self.mirrors_to_native() {
			self.inner.native.record_breadcrumb(&breadcrumb);
		}
	}

	/// Resets the session to a fresh anonymous default.
	pub fn clear_session(&self) {
		self.inner.session.clear();
		if self.mirrors_to_native() {
			let snapshot = self.inner.session.snapshot();
			self.inner.native.set_tags(&snapshot.tags);
			self.inner.native.set_user(&snapshot.user);
			self.inner.native.set_custom_data(&snapshot.custom_data);
		}
	}

	pub fn current_user(&self) -> User {
		self.inner.session.current_user()
	}

	/// Registers a callback invoked after every processed error. Handlers
	/// accumulate; registration never displaces earlier ones.
	pub fn register_error_handler(&self, handler: ErrorHandler) {
		self.inner.error_chain.register(handler);
	}

	/// Registers a callback invoked after every processed rejection.
	pub fn register_rejection_handler(&self, handler: ErrorHandler) {
		self.inner.rejection_chain.register(handler);
	}

	/// Processes a captured error: reports it (unless vetoed or stackless)
	/// and then dispatches the error handler chain. The chain runs even for
	/// reports that were dropped.
	pub async fn process_error(&self, error: &CapturedError, is_fatal: bool) {
		self.capture(error, is_fatal).await;
		self.inner.error_chain.dispatch(error, is_fatal);
	}

	/// Processes an unhandled rejection; always non-fatal.
	pub async fn process_rejection(&self, error: &CapturedError) {
		self.capture(error, false).await;
		self.inner.rejection_chain.dispatch(error, false);
	}

	/// Emits a RUM timing event stamped with the current session user.
	/// Send failures are logged, never surfaced.
	pub async fn send_rum_timing(
		&self,
		event_type: RumEventType,
		name: impl Into<String>,
		duration_ms: f64,
	) {
		let event = RumTimingEvent::new(
			event_type,
			name,
			duration_ms,
			self.inner.session.current_user().identifier,
		);
		if let Err(e) = self.inner.rum.send_timing(&event).await {
			warn!(error = %e, name = %event.name, "Failed to send RUM timing event");
		}
	}

	/// Replays cached reports now instead of waiting for the next startup.
	pub async fn flush_cached(&self) -> Result<usize> {
		self.inner.delivery.flush_cached(&self.inner.options.api_key).await
	}

	async fn capture(&self, error: &CapturedError, is_fatal: bool) {
		if !error.has_stack() {
			warn!(class_name = %error.class_name, "Error carries no stack; skipping report");
			return;
		}

		if is_fatal {
			let all = self.inner.session.add_tags([FATAL_TAG]);
			if self.mirrors_to_native() {
				self.inner.native.set_tags(&all);
			}
		}

		let frames = self.inner.resolver.resolve(error);
		let session = self.inner.session.snapshot();
		let payload = self.inner.payload_builder.build(error, &frames, &session).await;

		if let Some(filter) = &self.inner.options.on_before_send {
			// A panicking filter must not lose the report.
			let allowed = std::panic::catch_unwind(AssertUnwindSafe(|| filter(&payload)))
				.unwrap_or_else(|_| {
					warn!("Pre-send filter panicked; sending report anyway");
					true
				});
			if !allowed {
				debug!("Report vetoed by pre-send filter");
				return;
			}
		}

		let body = match serde_json::to_string(&payload) {
			Ok(body) => body,
			Err(e) => {
				warn!(error = %e, "Failed to serialize report; dropping");
				return;
			}
		};

		if self.mirrors_to_native() {
			self.inner.native.send_crash_report(&body, &self.inner.options.api_key);
		} else {
			self.inner.delivery.send(&self.inner.options.api_key, body).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use cinder_core::StackFrame;
	use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
	use std::sync::Mutex;
	use tempfile::TempDir;

	#[derive(Default)]
	struct RecordingCollector {
		bodies: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl RemoteCollector for RecordingCollector {
		async fn submit(&self, _api_key: &str, body: &str) -> Result<()> {
			self.bodies.lock().unwrap().push(body.to_string());
			Ok(())
		}
	}

	async fn test_client(
		options: ClientOptions,
		collector: Arc<RecordingCollector>,
		dir: &TempDir,
	) -> TelemetryClient {
		match TelemetryClientBuilder::new(options)
			.with_collector(collector as Arc<dyn RemoteCollector>)
			.with_cache_dir(dir.path())
			.with_panic_hook(false)
			.init()
			.await
			.unwrap()
		{
			InitOutcome::Ready(client) => client,
			InitOutcome::AlreadyInitialized => panic!("expected a fresh client"),
		}
	}

	fn error_with_stack() -> CapturedError {
		CapturedError::new("Error", "boom")
			.with_frames(vec![StackFrame::new("src/app.js", "main").at(1, 1)])
	}

	#[tokio::test]
	async fn init_requires_an_api_key() {
		let result = TelemetryClientBuilder::new(ClientOptions::default()).init().await;
		assert!(matches!(result, Err(TelemetryError::MissingApiKey)));
	}

	#[tokio::test]
	async fn rum_without_native_is_a_config_error() {
		let options = ClientOptions::new("key").with_rum(true);
		let result = TelemetryClientBuilder::new(options).init().await;
		assert!(matches!(result, Err(TelemetryError::RumRequiresNative)));
	}

	#[tokio::test]
	async fn process_error_delivers_a_report() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		client.process_error(&error_with_stack(), false).await;

		let bodies = collector.bodies.lock().unwrap();
		assert_eq!(bodies.len(), 1);
		assert!(bodies[0].contains("\"ClassName\":\"Error\""));
	}

	#[tokio::test]
	async fn stackless_errors_are_not_reported_but_handlers_still_run() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		let calls = Arc::new(AtomicU32::new(0));
		let calls_ref = Arc::clone(&calls);
		client.register_error_handler(Arc::new(move |_error, _fatal| {
			calls_ref.fetch_add(1, Ordering::SeqCst);
		}));

		client.process_error(&CapturedError::new("Error", "no stack"), false).await;

		assert!(collector.bodies.lock().unwrap().is_empty());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn fatal_errors_carry_the_fatal_tag() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		client.process_error(&error_with_stack(), true).await;

		let bodies = collector.bodies.lock().unwrap();
		assert!(bodies[0].contains("\"Fatal\""));
	}

	#[tokio::test]
	async fn pre_send_filter_can_veto_a_report() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let options = ClientOptions::new("key").with_on_before_send(Arc::new(|_payload| false));
		let client = test_client(options, Arc::clone(&collector), &dir).await;

		client.process_error(&error_with_stack(), false).await;

		assert!(collector.bodies.lock().unwrap().is_empty());
		// Nothing cached either: a veto is a drop, not a deferral.
		assert!(client.inner.delivery.cache().load("key").unwrap().is_empty());
	}

	#[tokio::test]
	async fn panicking_pre_send_filter_is_treated_as_allow() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let options =
			ClientOptions::new("key").with_on_before_send(Arc::new(|_payload| panic!("filter bug")));
		let client = test_client(options, Arc::clone(&collector), &dir).await;

		client.process_error(&error_with_stack(), false).await;

		assert_eq!(collector.bodies.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn unhandled_panics_are_reported_as_fatal() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = match TelemetryClientBuilder::new(ClientOptions::new("key"))
			.with_collector(Arc::clone(&collector) as Arc<dyn RemoteCollector>)
			.with_cache_dir(dir.path())
			.init()
			.await
			.unwrap()
		{
			InitOutcome::Ready(client) => client,
			InitOutcome::AlreadyInitialized => panic!("expected a fresh client"),
		};
		let _keep_alive = client;

		let caught = std::panic::catch_unwind(|| panic!("wheels came off"));
		assert!(caught.is_err());

		// The hook hands the report to the runtime; wait for it to land.
		for _ in 0..100 {
			if !collector.bodies.lock().unwrap().is_empty() {
				break;
			}
			tokio::time::sleep(std::time::Duration::from_millis(20)).await;
		}
		let bodies = collector.bodies.lock().unwrap();
		assert!(bodies.iter().any(|b| b.contains("wheels came off")));
		assert!(bodies.iter().any(|b| b.contains("\"Fatal\"")));
	}

	#[tokio::test]
	async fn rejections_dispatch_their_own_chain_as_non_fatal() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		let saw_fatal = Arc::new(AtomicBool::new(false));
		let saw = Arc::clone(&saw_fatal);
		client.register_rejection_handler(Arc::new(move |_error, fatal| {
			saw.store(fatal, Ordering::SeqCst);
		}));

		client.process_rejection(&error_with_stack()).await;

		assert!(!saw_fatal.load(Ordering::SeqCst));
		assert_eq!(collector.bodies.lock().unwrap().len(), 1);
	}

	#[tokio::test]
	async fn session_mutations_flow_into_reports() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		client.set_user("bob");
		client.add_tag("beta");
		client.record_breadcrumb("pressed checkout", BreadcrumbOptions::default());

		client.process_error(&error_with_stack(), false).await;

		let bodies = collector.bodies.lock().unwrap();
		assert!(bodies[0].contains("\"Identifier\":\"bob\""));
		assert!(bodies[0].contains("\"beta\""));
		assert!(bodies[0].contains("pressed checkout"));
	}

	#[derive(Default)]
	struct FakeNative {
		initialized: AtomicBool,
		sent_reports: Mutex<Vec<String>>,
		mirrored_tags: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl crate::native::NativeCapability for FakeNative {
		fn is_available(&self) -> bool {
			true
		}

		fn device_id(&self) -> Option<String> {
			Some("device-test".to_string())
		}

		async fn has_initialized(&self) -> bool {
			self.initialized.load(Ordering::SeqCst)
		}

		async fn init(&self, _api_key: &str, _rum_enabled: bool, _app_version: &str) {
			self.initialized.store(true, Ordering::SeqCst);
		}

		async fn environment_info(&self) -> Option<Map<String, Value>> {
			None
		}

		fn set_tags(&self, tags: &[String]) {
			*self.mirrored_tags.lock().unwrap() = tags.to_vec();
		}

		fn set_user(&self, _user: &User) {}
		fn set_custom_data(&self, _data: &Map<String, Value>) {}
		fn record_breadcrumb(&self, _breadcrumb: &cinder_core::Breadcrumb) {}

		fn send_crash_report(&self, payload_json: &str, _api_key: &str) {
			self.sent_reports.lock().unwrap().push(payload_json.to_string());
		}
	}

	struct NullMonitor;

	#[async_trait]
	impl crate::rum::RealtimeMonitor for NullMonitor {
		fn setup(&self, _api_key: &str, _enable_network_monitoring: bool, _ignore_urls: &[String]) {}

		async fn send_timing(&self, _event: &RumTimingEvent) -> Result<()> {
			Ok(())
		}
	}

	#[tokio::test]
	async fn engaged_native_path_delegates_transmission() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let native = Arc::new(FakeNative::default());
		let client = match TelemetryClientBuilder::new(ClientOptions::new("key"))
			.with_native(Arc::clone(&native) as Arc<dyn NativeCapability>)
			.with_collector(Arc::clone(&collector) as Arc<dyn RemoteCollector>)
			.with_cache_dir(dir.path())
			.with_panic_hook(false)
			.init()
			.await
			.unwrap()
		{
			InitOutcome::Ready(client) => client,
			InitOutcome::AlreadyInitialized => panic!("expected a fresh client"),
		};

		client.add_tag("mirrored");
		client.process_error(&error_with_stack(), false).await;

		assert!(collector.bodies.lock().unwrap().is_empty());
		assert_eq!(native.sent_reports.lock().unwrap().len(), 1);
		assert_eq!(*native.mirrored_tags.lock().unwrap(), vec!["mirrored"]);
	}

	#[tokio::test]
	async fn second_init_is_a_success_no_op() {
		let dir = TempDir::new().unwrap();
		let native = Arc::new(FakeNative::default());
		native.initialized.store(true, Ordering::SeqCst);

		let outcome = TelemetryClientBuilder::new(ClientOptions::new("key"))
			.with_native(native as Arc<dyn NativeCapability>)
			.with_cache_dir(dir.path())
			.init()
			.await
			.unwrap();
		assert!(matches!(outcome, InitOutcome::AlreadyInitialized));
	}

	#[tokio::test]
	async fn rum_with_native_and_monitor_initializes() {
		let dir = TempDir::new().unwrap();
		let native = Arc::new(FakeNative::default());
		let options = ClientOptions::new("key").with_rum(true);
		let client = match TelemetryClientBuilder::new(options)
			.with_native(native as Arc<dyn NativeCapability>)
			.with_monitor(Arc::new(NullMonitor))
			.with_cache_dir(dir.path())
			.with_panic_hook(false)
			.init()
			.await
			.unwrap()
		{
			InitOutcome::Ready(client) => client,
			InitOutcome::AlreadyInitialized => panic!("expected a fresh client"),
		};

		// Disabled-or-enabled, sending never surfaces an error.
		client.send_rum_timing(RumEventType::ActivityLoaded, "MainActivity", 33.0).await;
	}

	#[tokio::test]
	async fn clear_session_resets_identity() {
		let dir = TempDir::new().unwrap();
		let collector = Arc::new(RecordingCollector::default());
		let client = test_client(ClientOptions::new("key"), Arc::clone(&collector), &dir).await;

		client.set_user("bob");
		client.clear_session();
		assert!(client.current_user().is_anonymous);
	}
}
