// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client configuration.

use std::time::Duration;

use tracing::warn;

/// Default ingestion endpoint for crash reports.
pub const DEFAULT_ENDPOINT: &str = "https://api.raygun.io/entries";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for a [`RaygunClient`](crate::RaygunClient).
#[derive(Debug, Clone)]
pub struct RaygunSettings {
	/// API key identifying the target application.
	pub api_key: String,
	/// Ingestion endpoint reports are posted to.
	pub endpoint: String,
	/// Surface delivery failures to awaiting callers instead of only logging.
	pub throw_on_error: bool,
	/// Timeout applied to each delivery request.
	pub request_timeout: Duration,
}

impl Default for RaygunSettings {
	fn default() -> Self {
		Self {
			api_key: String::new(),
			endpoint: DEFAULT_ENDPOINT.to_string(),
			throw_on_error: false,
			request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
		}
	}
}

impl RaygunSettings {
	/// Builds settings from `RAYGUN_*` environment variables.
	///
	/// Missing or unparseable variables fall back to defaults. An absent
	/// `RAYGUN_API_KEY` leaves the key empty, which disables sending.
	pub fn from_env() -> Self {
		let api_key = std::env::var("RAYGUN_API_KEY").unwrap_or_default();

		let endpoint =
			std::env::var("RAYGUN_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

		let throw_on_error = std::env::var("RAYGUN_THROW_ON_ERROR")
			.map(|v| v == "1" || v.to_lowercase() == "true")
			.unwrap_or(false);

		let timeout_secs = match std::env::var("RAYGUN_TIMEOUT_SECS") {
			Ok(raw) => raw.parse().unwrap_or_else(|_| {
				warn!(value = %raw, "Ignoring unparseable RAYGUN_TIMEOUT_SECS");
				DEFAULT_TIMEOUT_SECS
			}),
			Err(_) => DEFAULT_TIMEOUT_SECS,
		};

		Self {
			api_key,
			endpoint,
			throw_on_error,
			request_timeout: Duration::from_secs(timeout_secs),
		}
	}

	/// Returns true if an API key has been provided.
	pub fn has_api_key(&self) -> bool {
		!self.api_key.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Mutex;

	static ENV_MUTEX: Mutex<()> = Mutex::new(());

	fn with_env_vars<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
		let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

		let saved: Vec<(String, Option<String>)> = vars
			.iter()
			.map(|(name, _)| ((*name).to_string(), std::env::var(name).ok()))
			.collect();

		for (name, value) in vars {
			match value {
				Some(value) => std::env::set_var(name, value),
				None => std::env::remove_var(name),
			}
		}

		f();

		for (name, value) in saved {
			match value {
				Some(value) => std::env::set_var(&name, value),
				None => std::env::remove_var(&name),
			}
		}
	}

	#[test]
	fn test_defaults() {
		let settings = RaygunSettings::default();

		assert!(settings.api_key.is_empty());
		assert!(!settings.has_api_key());
		assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
		assert!(!settings.throw_on_error);
		assert_eq!(settings.request_timeout, Duration::from_secs(30));
	}

	#[test]
	fn test_from_env_reads_all_vars() {
		with_env_vars(
			&[
				("RAYGUN_API_KEY", Some("key123")),
				("RAYGUN_ENDPOINT", Some("https://crash.example.com/entries")),
				("RAYGUN_THROW_ON_ERROR", Some("true")),
				("RAYGUN_TIMEOUT_SECS", Some("5")),
			],
			|| {
				let settings = RaygunSettings::from_env();

				assert_eq!(settings.api_key, "key123");
				assert!(settings.has_api_key());
				assert_eq!(settings.endpoint, "https://crash.example.com/entries");
				assert!(settings.throw_on_error);
				assert_eq!(settings.request_timeout, Duration::from_secs(5));
			},
		);
	}

	#[test]
	fn test_from_env_falls_back_to_defaults() {
		with_env_vars(
			&[
				("RAYGUN_API_KEY", None),
				("RAYGUN_ENDPOINT", None),
				("RAYGUN_THROW_ON_ERROR", None),
				("RAYGUN_TIMEOUT_SECS", None),
			],
			|| {
				let settings = RaygunSettings::from_env();

				assert!(!settings.has_api_key());
				assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
				assert!(!settings.throw_on_error);
				assert_eq!(settings.request_timeout, Duration::from_secs(30));
			},
		);
	}

	#[test]
	fn test_from_env_ignores_invalid_timeout() {
		with_env_vars(&[("RAYGUN_TIMEOUT_SECS", Some("soon"))], || {
			let settings = RaygunSettings::from_env();

			assert_eq!(settings.request_timeout, Duration::from_secs(30));
		});
	}

	#[test]
	fn test_throw_on_error_parsing() {
		with_env_vars(&[("RAYGUN_THROW_ON_ERROR", Some("1"))], || {
			assert!(RaygunSettings::from_env().throw_on_error);
		});

		with_env_vars(&[("RAYGUN_THROW_ON_ERROR", Some("0"))], || {
			assert!(!RaygunSettings::from_env().throw_on_error);
		});
	}
}
