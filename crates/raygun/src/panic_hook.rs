// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Panic hook reporting through the attached client.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::error;

use crate::client::RaygunClient;

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
static PREVIOUS_HOOK: Mutex<Option<PanicHook>> = Mutex::new(None);

thread_local! {
	static REPORTING: Cell<bool> = const { Cell::new(false) };
}

/// Error synthesized from a panic payload.
#[derive(Debug)]
pub(crate) struct PanicError {
	message: String,
	location: Option<String>,
}

impl fmt::Display for PanicError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.location {
			Some(location) => write!(f, "panic at {}: {}", location, self.message),
			None => write!(f, "panic: {}", self.message),
		}
	}
}

impl Error for PanicError {}

/// Installs the reporting hook, chaining to the previously set hook.
///
/// Repeated installs are no-ops until [`uninstall`] runs.
pub(crate) fn install() {
	if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
		return;
	}

	let previous = panic::take_hook();
	*PREVIOUS_HOOK.lock().unwrap_or_else(|e| e.into_inner()) = Some(previous);

	panic::set_hook(Box::new(|info| {
		report_panic(info);

		let previous = PREVIOUS_HOOK.lock().unwrap_or_else(|e| e.into_inner());
		if let Some(hook) = previous.as_ref() {
			hook(info);
		}
	}));
}

/// Removes the reporting hook, restoring the previously set one.
pub(crate) fn uninstall() {
	if !HOOK_INSTALLED.swap(false, Ordering::SeqCst) {
		return;
	}

	let previous = PREVIOUS_HOOK.lock().unwrap_or_else(|e| e.into_inner()).take();
	match previous {
		Some(hook) => panic::set_hook(hook),
		None => {
			let _ = panic::take_hook();
		}
	}
}

#[cfg(test)]
pub(crate) fn is_installed() -> bool {
	HOOK_INSTALLED.load(Ordering::SeqCst)
}

/// Builds a report from the panic and delivers it before unwinding resumes.
fn report_panic(info: &PanicHookInfo<'_>) {
	let Some(client) = RaygunClient::current() else {
		return;
	};

	// A panic raised while reporting must not recurse into the hook. The
	// guard is per-thread so a panic on another thread still gets reported.
	if REPORTING.replace(true) {
		return;
	}

	let message = panic_message(info.payload());
	let location = info
		.location()
		.map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));

	// Deliver on a fresh thread: the panicking thread may be a runtime
	// worker, and the blocking HTTP path must not run on one.
	let handle = std::thread::spawn(move || {
		let panic_error = PanicError {
			message: message.clone(),
			location,
		};
		client.send_panic_blocking(&panic_error, message);
	});

	if handle.join().is_err() {
		error!("Panic report delivery thread panicked");
	}

	REPORTING.set(false);
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic payload".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_panic_message_from_str() {
		let payload: Box<dyn Any + Send> = Box::new("boom");
		assert_eq!(panic_message(payload.as_ref()), "boom");
	}

	#[test]
	fn test_panic_message_from_string() {
		let payload: Box<dyn Any + Send> = Box::new("formatted boom".to_string());
		assert_eq!(panic_message(payload.as_ref()), "formatted boom");
	}

	#[test]
	fn test_panic_message_unknown_payload() {
		let payload: Box<dyn Any + Send> = Box::new(7u32);
		assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
	}

	#[test]
	fn test_panic_error_display() {
		let with_location = PanicError {
			message: "boom".to_string(),
			location: Some("src/main.rs:10:5".to_string()),
		};
		assert_eq!(with_location.to_string(), "panic at src/main.rs:10:5: boom");

		let without_location = PanicError {
			message: "boom".to_string(),
			location: None,
		};
		assert_eq!(without_location.to_string(), "panic: boom");
	}
}
