// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP delivery of crash reports.

use std::time::Duration;

use async_trait::async_trait;
use raygun_core::RaygunMessage;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::builder::{CLIENT_NAME, CLIENT_VERSION};
use crate::error::Result;
use crate::settings::RaygunSettings;

/// Content type the ingestion API expects for report payloads.
pub(crate) const RAYGUN_CONTENT_TYPE: &str = "application/x-raygun-message";

/// Header carrying the API key.
pub(crate) const API_KEY_HEADER: &str = "X-ApiKey";

/// Delivery mechanism for finished crash reports.
///
/// Abstracting delivery keeps the client logic independent of the HTTP stack
/// and lets tests capture reports without a network.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Delivers a report to the ingestion endpoint.
	async fn deliver(&self, message: &RaygunMessage) -> Result<()>;

	/// Delivers a report without an async runtime.
	///
	/// Used on the panic path and when sending from non-async code.
	fn deliver_blocking(&self, message: &RaygunMessage) -> Result<()>;
}

/// Posts reports to the Raygun ingestion API.
///
/// Each report is a single POST. The response status is logged but never
/// acted on; there are no retries.
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
	api_key: String,
	request_timeout: Duration,
}

impl HttpTransport {
	/// Creates a transport from `settings`.
	pub fn new(settings: &RaygunSettings) -> Result<Self> {
		// Crash reports are rare; keep no idle connections between them.
		let client = reqwest::Client::builder()
			.user_agent(format!("{}/{}", CLIENT_NAME, CLIENT_VERSION))
			.timeout(settings.request_timeout)
			.pool_max_idle_per_host(0)
			.build()?;

		Ok(Self {
			client,
			endpoint: settings.endpoint.clone(),
			api_key: settings.api_key.clone(),
			request_timeout: settings.request_timeout,
		})
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn deliver(&self, message: &RaygunMessage) -> Result<()> {
		let payload = serde_json::to_string(message)?;

		debug!(endpoint = %self.endpoint, bytes = payload.len(), "Posting crash report");

		let response = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, RAYGUN_CONTENT_TYPE)
			.header(API_KEY_HEADER, self.api_key.as_str())
			.body(payload)
			.send()
			.await?;

		debug!(status = %response.status(), "Crash report posted");

		Ok(())
	}

	fn deliver_blocking(&self, message: &RaygunMessage) -> Result<()> {
		let payload = serde_json::to_string(message)?;

		debug!(endpoint = %self.endpoint, bytes = payload.len(), "Posting crash report");

		// Use a fresh blocking client; this path runs at panic time or from
		// non-async code, where the shared async client is unusable.
		let client = reqwest::blocking::Client::builder()
			.user_agent(format!("{}/{}", CLIENT_NAME, CLIENT_VERSION))
			.timeout(self.request_timeout)
			.build()?;

		let response = client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, RAYGUN_CONTENT_TYPE)
			.header(API_KEY_HEADER, self.api_key.as_str())
			.body(payload)
			.send()?;

		debug!(status = %response.status(), "Crash report posted");

		Ok(())
	}
}
