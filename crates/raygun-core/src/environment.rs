// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Host environment section of a crash report.

use serde::{Deserialize, Serialize};

/// Host environment metrics captured when a report is built.
///
/// Every field is best-effort; probes that fail on a given platform simply
/// leave their field absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunEnvironmentMessage {
	/// Number of logical processors.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub processor_count: Option<usize>,

	/// Operating system name and version.
	#[serde(rename = "OSVersion", skip_serializing_if = "Option::is_none")]
	pub os_version: Option<String>,

	/// Processor architecture, e.g. `x86_64` or `aarch64`.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub architecture: Option<String>,

	/// Total physical memory in megabytes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub total_physical_memory: Option<u64>,

	/// Available physical memory in megabytes.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub available_physical_memory: Option<u64>,

	/// Local offset from UTC in hours.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub utc_offset: Option<f64>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn os_version_uses_legacy_wire_key() {
		let environment = RaygunEnvironmentMessage {
			os_version: Some("Ubuntu 24.04".to_string()),
			..Default::default()
		};

		let value = serde_json::to_value(&environment).unwrap();
		assert_eq!(value["OSVersion"], "Ubuntu 24.04");
		assert!(value.get("OsVersion").is_none());
	}

	#[test]
	fn default_serializes_to_empty_object() {
		let value = serde_json::to_value(RaygunEnvironmentMessage::default()).unwrap();
		assert_eq!(value, serde_json::json!({}));
	}

	#[test]
	fn utc_offset_may_be_fractional() {
		let environment = RaygunEnvironmentMessage {
			utc_offset: Some(5.5),
			..Default::default()
		};

		let value = serde_json::to_value(&environment).unwrap();
		assert_eq!(value["UtcOffset"], 5.5);
	}
}
