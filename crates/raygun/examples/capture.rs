// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Report a handled error, a wrapped operation, and attach the
//! panic hook.
//!
//! Run with:
//!   RAYGUN_API_KEY=your_key cargo run --example capture -p raygun

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use raygun::{RaygunClient, RaygunSettings};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct CacheMiss {
	key: String,
}

impl fmt::Display for CacheMiss {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "cache entry {} is gone", self.key)
	}
}

impl std::error::Error for CacheMiss {}

fn lookup(key: &str) -> Result<String, CacheMiss> {
	Err(CacheMiss {
		key: key.to_string(),
	})
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Initialize logging
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
		)
		.init();

	// Configure from environment; without RAYGUN_API_KEY nothing is sent
	let settings = RaygunSettings::from_env();

	println!("Initializing Raygun client...");
	println!("  Endpoint: {}", settings.endpoint);
	println!("  API key provided: {}", settings.has_api_key());

	let client = RaygunClient::from_settings(settings)?;
	client.set_user("example@example.com");
	client.set_application_version("0.1.0-example");

	// Report panics raised anywhere in the process
	RaygunClient::attach_client(client.clone());

	// Report a handled error with tags and custom data
	println!("\nReporting a handled error...");
	let error = CacheMiss {
		key: "session:42".to_string(),
	};
	let mut custom_data = HashMap::new();
	custom_data.insert("cache".to_string(), serde_json::json!("sessions"));
	client.send(&error, Some(vec!["example".to_string()]), Some(custom_data));

	// Report and re-raise around a fallible operation
	println!("Wrapping a fallible operation...");
	let result = client.wrap(|| lookup("user:7"), Some(vec!["lookup".to_string()]));
	println!("  Wrapped call returned: {:?}", result);

	// Background deliveries are detached; give them a moment to finish
	tokio::time::sleep(Duration::from_secs(2)).await;

	RaygunClient::detach();
	println!("\nDone.");

	Ok(())
}
