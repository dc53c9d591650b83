// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper-error registry and stripping.

use std::any::TypeId;
use std::error::Error;
use std::io;
use std::sync::RwLock;

use tracing::debug;

/// Matcher for one registered wrapper type.
struct WrapperMatcher {
	type_id: TypeId,
	type_name: &'static str,
	matches: fn(&(dyn Error + 'static)) -> bool,
}

fn matches_type<E: Error + 'static>(error: &(dyn Error + 'static)) -> bool {
	error.is::<E>()
}

/// Registry of error types treated as pass-through wrappers.
///
/// A wrapper error's only job is to carry the interesting failure as its
/// cause; reports are built from the innermost non-wrapper cause so grouping
/// and display use the real error. [`std::io::Error`] is registered by
/// default: it is the common carrier for smuggling an unrelated boxed error
/// across an API boundary, and plain OS errors carry no cause so they are
/// never stripped.
pub struct WrapperExceptions {
	matchers: RwLock<Vec<WrapperMatcher>>,
}

impl WrapperExceptions {
	/// Creates a registry seeded with the default wrapper types.
	pub fn new() -> Self {
		let registry = Self::empty();
		registry.add::<io::Error>();
		registry
	}

	/// Creates a registry with no wrapper types registered.
	pub fn empty() -> Self {
		Self {
			matchers: RwLock::new(Vec::new()),
		}
	}

	/// Registers `E` as a wrapper type.
	///
	/// Registering the same type more than once has no effect.
	pub fn add<E: Error + 'static>(&self) {
		let type_id = TypeId::of::<E>();
		let mut matchers = self.matchers.write().unwrap_or_else(|e| e.into_inner());
		if matchers.iter().any(|m| m.type_id == type_id) {
			return;
		}
		matchers.push(WrapperMatcher {
			type_id,
			type_name: std::any::type_name::<E>(),
			matches: matches_type::<E>,
		});
		debug!(wrapper = std::any::type_name::<E>(), "Registered wrapper error type");
	}

	/// Returns the number of registered wrapper types.
	pub fn len(&self) -> usize {
		self.matchers.read().unwrap_or_else(|e| e.into_inner()).len()
	}

	/// Returns true if no wrapper types are registered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns true if `error`'s concrete type is a registered wrapper.
	pub fn is_wrapper(&self, error: &(dyn Error + 'static)) -> bool {
		let matchers = self.matchers.read().unwrap_or_else(|e| e.into_inner());
		matchers.iter().any(|m| (m.matches)(error))
	}

	/// Returns the names of the registered wrapper types.
	pub fn type_names(&self) -> Vec<&'static str> {
		let matchers = self.matchers.read().unwrap_or_else(|e| e.into_inner());
		matchers.iter().map(|m| m.type_name).collect()
	}
}

impl Default for WrapperExceptions {
	fn default() -> Self {
		Self::new()
	}
}

/// Returns the error wrapped by `error`, if any.
///
/// For most types this is [`Error::source`]. `io::Error` keeps a custom
/// payload reachable only through [`io::Error::get_ref`] (its `source` skips
/// ahead to the payload's own source), so the payload is returned instead.
fn wrapped_cause<'a>(error: &'a (dyn Error + 'static)) -> Option<&'a (dyn Error + 'static)> {
	if let Some(io_error) = error.downcast_ref::<io::Error>() {
		if let Some(inner) = io_error.get_ref() {
			let inner: &(dyn Error + 'static) = inner;
			return Some(inner);
		}
		return None;
	}
	error.source()
}

/// Strips registered wrapper errors, returning the innermost meaningful cause.
///
/// Walks the cause chain while the current error's type is a registered
/// wrapper and a cause exists. Stops at the first non-wrapper error, or at a
/// wrapper with no cause, which is then returned as-is. Cause chains are
/// finite by construction so no cycle detection is needed.
pub fn strip_wrapper_exceptions<'a>(
	mut error: &'a (dyn Error + 'static),
	wrappers: &WrapperExceptions,
) -> &'a (dyn Error + 'static) {
	while wrappers.is_wrapper(error) {
		match wrapped_cause(error) {
			Some(inner) => error = inner,
			None => break,
		}
	}
	error
}
