// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fluent assembly of crash report payloads.

use std::collections::HashMap;
use std::error::Error;

use chrono::Local;
use raygun_core::{
	RaygunClientMessage, RaygunEnvironmentMessage, RaygunErrorMessage, RaygunMessage,
	RaygunMessageDetails,
};
use serde_json::Value;
use sysinfo::System;

use crate::backtrace;

pub(crate) const CLIENT_NAME: &str = "raygun4rust";
pub(crate) const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const CLIENT_URL: &str = "https://github.com/ghuntley/raygun4rust";

/// Builder for [`RaygunMessage`] payloads.
///
/// Every section is optional; setters store exactly what they are given and
/// absent sections are omitted from the serialized report.
pub struct RaygunMessageBuilder {
	details: RaygunMessageDetails,
}

impl RaygunMessageBuilder {
	/// Creates a builder with no sections populated.
	pub fn new() -> Self {
		Self {
			details: RaygunMessageDetails::default(),
		}
	}

	/// Captures host details (CPU count, OS version, memory, UTC offset).
	pub fn set_environment_details(mut self) -> Self {
		self.details.environment = Some(gather_environment());
		self
	}

	/// Sets the reporting machine's name.
	pub fn set_machine_name(mut self, machine_name: Option<String>) -> Self {
		self.details.machine_name = machine_name;
		self
	}

	/// Builds the error section from `error` and its cause chain.
	///
	/// The outermost error carries the captured stack trace; causes are
	/// nested recursively without one since Rust errors do not record where
	/// they were created.
	pub fn set_error_details(mut self, error: &(dyn Error + 'static)) -> Self {
		let mut message = build_error_chain(error);
		message.stack_trace = backtrace::capture_stack_trace();
		self.details.error = Some(message);
		self
	}

	/// Identifies this library as the reporting client.
	pub fn set_client_details(mut self) -> Self {
		self.details.client = Some(RaygunClientMessage {
			name: CLIENT_NAME.to_string(),
			version: CLIENT_VERSION.to_string(),
			client_url: CLIENT_URL.to_string(),
		});
		self
	}

	/// Sets the application version the report is attributed to.
	pub fn set_version(mut self, version: Option<String>) -> Self {
		self.details.version = version;
		self
	}

	/// Sets the tags attached to the report.
	///
	/// An empty list is treated as absent so the serialized report omits the
	/// field instead of sending an empty placeholder.
	pub fn set_tags(mut self, tags: Option<Vec<String>>) -> Self {
		self.details.tags = tags.filter(|tags| !tags.is_empty());
		self
	}

	/// Sets the custom data attached to the report.
	pub fn set_user_custom_data(mut self, user_custom_data: Option<HashMap<String, Value>>) -> Self {
		self.details.user_custom_data = user_custom_data;
		self
	}

	/// Sets the affected user identifier.
	pub fn set_user(mut self, user: Option<String>) -> Self {
		self.details.user = user;
		self
	}

	/// Finalizes the report, stamping the occurrence time.
	pub fn build(self) -> RaygunMessage {
		RaygunMessage::new(self.details)
	}
}

impl Default for RaygunMessageBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Builds the error message tree for `error` and its transitive causes.
fn build_error_chain(error: &(dyn Error + 'static)) -> RaygunErrorMessage {
	RaygunErrorMessage {
		class_name: Some(error_class_name(error)),
		message: Some(error.to_string()),
		stack_trace: Vec::new(),
		data: None,
		inner_error: error.source().map(|source| Box::new(build_error_chain(source))),
	}
}

/// Derives a type name for `error` from its debug representation.
///
/// Trait objects erase the concrete type, but derived `Debug` output starts
/// with the type name: `Leaf("boom")`, `Parse { line: 3 }`, `BareError`.
fn error_class_name(error: &(dyn Error + 'static)) -> String {
	let debug = format!("{:?}", error);
	let class = debug
		.split(['(', '{', ' ', '\n'])
		.next()
		.unwrap_or_default()
		.trim_end_matches(':');

	if class.is_empty() {
		"Error".to_string()
	} else {
		class.to_string()
	}
}

/// Collects details about the host the report originates from.
fn gather_environment() -> RaygunEnvironmentMessage {
	let mut system = System::new_all();
	system.refresh_all();

	RaygunEnvironmentMessage {
		processor_count: Some(system.cpus().len()),
		os_version: System::long_os_version(),
		architecture: Some(std::env::consts::ARCH.to_string()),
		total_physical_memory: Some(system.total_memory() / (1024 * 1024)),
		available_physical_memory: Some(system.available_memory() / (1024 * 1024)),
		utc_offset: Some(utc_offset_hours()),
	}
}

fn utc_offset_hours() -> f64 {
	f64::from(Local::now().offset().local_minus_utc()) / 3600.0
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fmt;

	#[derive(Debug)]
	struct Leaf(String);

	impl fmt::Display for Leaf {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			write!(f, "{}", self.0)
		}
	}

	impl Error for Leaf {}

	#[derive(Debug)]
	struct Shell(Box<dyn Error + 'static>);

	impl fmt::Display for Shell {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			write!(f, "shell around: {}", self.0)
		}
	}

	impl Error for Shell {
		fn source(&self) -> Option<&(dyn Error + 'static)> {
			Some(self.0.as_ref())
		}
	}

	#[derive(Debug)]
	struct Parse {
		#[allow(dead_code)]
		line: u32,
	}

	impl fmt::Display for Parse {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			write!(f, "parse failed at line {}", self.line)
		}
	}

	impl Error for Parse {}

	#[test]
	fn test_error_class_name_tuple_variant() {
		let error = Leaf("boom".to_string());
		assert_eq!(error_class_name(&error), "Leaf");
	}

	#[test]
	fn test_error_class_name_struct_variant() {
		let error = Parse { line: 3 };
		assert_eq!(error_class_name(&error), "Parse");
	}

	#[test]
	fn test_error_class_name_io_error() {
		let error = std::io::Error::from(std::io::ErrorKind::NotFound);
		let class = error_class_name(&error);
		assert!(!class.is_empty());
		assert!(!class.contains('{'));
	}

	#[test]
	fn test_build_includes_client_details() {
		let message = RaygunMessageBuilder::new().set_client_details().build();

		let client = message.details.client.unwrap();
		assert_eq!(client.name, "raygun4rust");
		assert_eq!(client.version, env!("CARGO_PKG_VERSION"));
		assert!(client.client_url.starts_with("https://"));
	}

	#[test]
	fn test_error_details_include_cause_chain() {
		let error = Shell(Box::new(Leaf("root cause".to_string())));
		let message = RaygunMessageBuilder::new().set_error_details(&error).build();

		let details = message.details.error.unwrap();
		assert_eq!(details.class_name.as_deref(), Some("Shell"));
		assert_eq!(details.message.as_deref(), Some("shell around: root cause"));

		let inner = details.inner_error.unwrap();
		assert_eq!(inner.class_name.as_deref(), Some("Leaf"));
		assert_eq!(inner.message.as_deref(), Some("root cause"));
		assert!(inner.inner_error.is_none());
		assert!(inner.stack_trace.is_empty());
	}

	#[test]
	fn test_unset_sections_stay_absent() {
		let message = RaygunMessageBuilder::new().build();

		assert!(message.details.machine_name.is_none());
		assert!(message.details.version.is_none());
		assert!(message.details.error.is_none());
		assert!(message.details.environment.is_none());
		assert!(message.details.client.is_none());
		assert!(message.details.tags.is_none());
		assert!(message.details.user_custom_data.is_none());
		assert!(message.details.user.is_none());
	}

	#[test]
	fn test_set_tags_drops_empty_list() {
		let message = RaygunMessageBuilder::new().set_tags(Some(Vec::new())).build();

		assert!(message.details.tags.is_none());
	}

	#[test]
	fn test_environment_details_are_populated() {
		let message = RaygunMessageBuilder::new().set_environment_details().build();

		let environment = message.details.environment.unwrap();
		assert!(environment.processor_count.unwrap_or(0) >= 1);
		assert!(environment.total_physical_memory.unwrap_or(0) > 0);
		assert_eq!(environment.architecture.as_deref(), Some(std::env::consts::ARCH));
	}
}
