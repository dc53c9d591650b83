// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error detail section of a crash report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The error portion of a crash report.
///
/// Nested causes are carried recursively in `inner_error`, innermost last,
/// mirroring how the ingestion endpoint groups chained errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunErrorMessage {
	/// Name of the error's concrete type.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,

	/// The error's display message.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,

	/// Stack frames captured where the report was built, outermost first.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub stack_trace: Vec<RaygunStackTraceLine>,

	/// Key/value side channel attached to this error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<HashMap<String, serde_json::Value>>,

	/// The cause of this error, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inner_error: Option<Box<RaygunErrorMessage>>,
}

/// A single stack frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunStackTraceLine {
	/// Source file the frame points into.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file_name: Option<String>,

	/// Line number within the source file.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line_number: Option<u32>,

	/// Module path containing the function.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class_name: Option<String>,

	/// Fully qualified function name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub method_name: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nested_causes_serialize_recursively() {
		let error = RaygunErrorMessage {
			class_name: Some("QueryFailed".to_string()),
			message: Some("query failed".to_string()),
			inner_error: Some(Box::new(RaygunErrorMessage {
				class_name: Some("ConnectionReset".to_string()),
				message: Some("connection reset by peer".to_string()),
				..Default::default()
			})),
			..Default::default()
		};

		let value = serde_json::to_value(&error).unwrap();
		assert_eq!(value["ClassName"], "QueryFailed");
		assert_eq!(value["InnerError"]["ClassName"], "ConnectionReset");
		assert!(value["InnerError"].get("InnerError").is_none());
	}

	#[test]
	fn empty_stack_trace_is_omitted() {
		let error = RaygunErrorMessage {
			message: Some("boom".to_string()),
			..Default::default()
		};

		let value = serde_json::to_value(&error).unwrap();
		assert!(value.get("StackTrace").is_none());
		assert!(value.get("Data").is_none());
	}

	#[test]
	fn stack_frames_serialize_in_order() {
		let error = RaygunErrorMessage {
			stack_trace: vec![
				RaygunStackTraceLine {
					method_name: Some("app::handlers::process".to_string()),
					class_name: Some("app::handlers".to_string()),
					file_name: Some("src/handlers.rs".to_string()),
					line_number: Some(42),
				},
				RaygunStackTraceLine {
					method_name: Some("app::main".to_string()),
					..Default::default()
				},
			],
			..Default::default()
		};

		let value = serde_json::to_value(&error).unwrap();
		assert_eq!(value["StackTrace"][0]["MethodName"], "app::handlers::process");
		assert_eq!(value["StackTrace"][0]["LineNumber"], 42);
		assert_eq!(value["StackTrace"][1]["MethodName"], "app::main");
		assert!(value["StackTrace"][1].get("FileName").is_none());
	}

	#[test]
	fn data_entries_appear_under_the_error() {
		let mut data = HashMap::new();
		data.insert("Message".to_string(), serde_json::json!("process terminated"));

		let error = RaygunErrorMessage {
			message: Some("boom".to_string()),
			data: Some(data),
			..Default::default()
		};

		let value = serde_json::to_value(&error).unwrap();
		assert_eq!(value["Data"]["Message"], "process terminated");
	}
}
