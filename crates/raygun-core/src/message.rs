// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Top-level crash report envelope and its detail sections.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::RaygunEnvironmentMessage;
use crate::error::RaygunErrorMessage;

/// A complete crash report as accepted by the Raygun ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunMessage {
	/// When the error occurred, in UTC.
	pub occurred_on: DateTime<Utc>,
	/// The report body.
	pub details: RaygunMessageDetails,
}

impl RaygunMessage {
	/// Wraps `details` into a message stamped with the current time.
	pub fn new(details: RaygunMessageDetails) -> Self {
		Self {
			occurred_on: Utc::now(),
			details,
		}
	}
}

/// The body of a crash report.
///
/// Every section is optional on the wire; absent sections are omitted from
/// the serialized JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunMessageDetails {
	/// Host name of the machine the error occurred on.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub machine_name: Option<String>,

	/// Version of the reporting application.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,

	/// The error being reported.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<RaygunErrorMessage>,

	/// Host environment metrics at the time of the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub environment: Option<RaygunEnvironmentMessage>,

	/// Identity of the reporting SDK.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub client: Option<RaygunClientMessage>,

	/// Caller-supplied tags for grouping and search.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,

	/// Caller-supplied key/value data attached to the report.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user_custom_data: Option<HashMap<String, serde_json::Value>>,

	/// Identity of the affected user.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
}

/// Identity of the SDK that produced a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RaygunClientMessage {
	/// SDK name.
	pub name: String,
	/// SDK version.
	pub version: String,
	/// URL of the SDK's home page or repository.
	pub client_url: String,
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn tags_preserve_order_on_the_wire(
			tags in proptest::collection::vec("[a-zA-Z0-9_-]{1,12}", 1..6)
		) {
			let message = RaygunMessage::new(RaygunMessageDetails {
				tags: Some(tags.clone()),
				..Default::default()
			});

			let value = serde_json::to_value(&message).unwrap();
			let wire_tags: Vec<String> =
				serde_json::from_value(value["Details"]["Tags"].clone()).unwrap();
			prop_assert_eq!(wire_tags, tags);
		}

		#[test]
		fn empty_details_serialize_to_empty_object(
			machine in prop::option::of("[a-z]{1,10}")
		) {
			let details = RaygunMessageDetails {
				machine_name: machine.clone(),
				..Default::default()
			};

			let value = serde_json::to_value(&details).unwrap();
			let object = value.as_object().unwrap();
			prop_assert_eq!(object.len(), usize::from(machine.is_some()));
		}
	}
}
