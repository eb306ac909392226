// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Handler chaining for error and rejection callbacks.
//!
//! Registering a handler never displaces previously registered ones; a
//! dispatch invokes every handler in registration order. Handlers run
//! outside the chain's lock so a handler can itself register handlers.

use std::sync::{Arc, Mutex};

use cinder_core::CapturedError;

/// Callback invoked for every processed error.
pub type ErrorHandler = Arc<dyn Fn(&CapturedError, bool) + Send + Sync>;

/// An ordered, append-only chain of [`ErrorHandler`]s.
#[derive(Default)]
pub struct HandlerChain {
	handlers: Mutex<Vec<ErrorHandler>>,
}

impl HandlerChain {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&self, handler: ErrorHandler) {
		self
			.handlers
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.push(handler);
	}

	/// Invokes every registered handler in order.
	pub fn dispatch(&self, error: &CapturedError, is_fatal: bool) {
		for handler in self.snapshot() {
			handler(error, is_fatal);
		}
	}

	fn snapshot(&self) -> Vec<ErrorHandler> {
		self
			.handlers
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
			.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	#[test]
	fn dispatch_runs_handlers_in_registration_order() {
		let chain = HandlerChain::new();
		let order = Arc::new(Mutex::new(Vec::new()));

		for i in 0..3 {
			let order = Arc::clone(&order);
			chain.register(Arc::new(move |_error, _fatal| {
				order.lock().unwrap().push(i);
			}));
		}

		chain.dispatch(&CapturedError::new("Error", "boom"), false);
		assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
	}

	#[test]
	fn registration_does_not_displace_existing_handlers() {
		let chain = HandlerChain::new();
		let calls = Arc::new(AtomicU32::new(0));

		for _ in 0..2 {
			let calls = Arc::clone(&calls);
			chain.register(Arc::new(move |_error, _fatal| {
				calls.fetch_add(1, Ordering::SeqCst);
			}));
		}

		chain.dispatch(&CapturedError::new("Error", "boom"), true);
		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[test]
	fn a_handler_may_register_another_handler() {
		let chain = Arc::new(HandlerChain::new());
		let late_calls = Arc::new(AtomicU32::new(0));

		let chain_ref = Arc::clone(&chain);
		let late = Arc::clone(&late_calls);
		chain.register(Arc::new(move |_error, _fatal| {
			let late = Arc::clone(&late);
			chain_ref.register(Arc::new(move |_error, _fatal| {
				late.fetch_add(1, Ordering::SeqCst);
			}));
		}));

		chain.dispatch(&CapturedError::new("Error", "boom"), false);
		assert_eq!(late_calls.load(Ordering::SeqCst), 0);
		chain.dispatch(&CapturedError::new("Error", "boom"), false);
		assert_eq!(late_calls.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn empty_chain_dispatch_is_a_no_op() {
		let chain = HandlerChain::new();
		chain.dispatch(&CapturedError::new("Error", "boom"), false);
	}
}
