// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash reporting client.

use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use raygun_core::RaygunMessage;
use serde_json::Value;
use sysinfo::System;
use tokio::runtime::Handle;
use tracing::{debug, error, info};

use crate::builder::RaygunMessageBuilder;
use crate::error::Result;
use crate::panic_hook;
use crate::settings::RaygunSettings;
use crate::transport::{HttpTransport, Transport};
use crate::wrapper::{strip_wrapper_exceptions, WrapperExceptions};

/// Custom data key carrying the originating event's message.
const EVENT_MESSAGE_KEY: &str = "Message";

/// Client attached to the process-wide panic hook.
static CURRENT: RwLock<Option<RaygunClient>> = RwLock::new(None);

/// Internal client state.
struct RaygunClientInner {
	settings: RaygunSettings,
	user: RwLock<Option<String>>,
	application_version: RwLock<Option<String>>,
	wrapper_exceptions: WrapperExceptions,
	transport: Arc<dyn Transport>,
}

/// Builder for constructing a RaygunClient.
pub struct RaygunClientBuilder {
	settings: RaygunSettings,
	user: Option<String>,
	application_version: Option<String>,
	transport: Option<Arc<dyn Transport>>,
}

impl RaygunClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			settings: RaygunSettings::default(),
			user: None,
			application_version: None,
			transport: None,
		}
	}

	/// Sets the API key identifying the target application.
	pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
		self.settings.api_key = api_key.into();
		self
	}

	/// Replaces the whole settings block.
	pub fn settings(mut self, settings: RaygunSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the ingestion endpoint reports are posted to.
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.settings.endpoint = endpoint.into();
		self
	}

	/// Sets the application version reports are attributed to.
	pub fn application_version(mut self, version: impl Into<String>) -> Self {
		self.application_version = Some(version.into());
		self
	}

	/// Sets the affected user attached to reports.
	pub fn user(mut self, user: impl Into<String>) -> Self {
		self.user = Some(user.into());
		self
	}

	/// Surfaces delivery failures to awaiting callers instead of only logging.
	pub fn throw_on_error(mut self, throw_on_error: bool) -> Self {
		self.settings.throw_on_error = throw_on_error;
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.settings.request_timeout = timeout;
		self
	}

	/// Replaces the delivery mechanism reports go through.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Builds the RaygunClient.
	pub fn build(self) -> Result<RaygunClient> {
		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(&self.settings)?),
		};

		let inner = Arc::new(RaygunClientInner {
			settings: self.settings,
			user: RwLock::new(self.user),
			application_version: RwLock::new(self.application_version),
			wrapper_exceptions: WrapperExceptions::new(),
			transport,
		});

		info!(endpoint = %inner.settings.endpoint, "Raygun client initialized");

		Ok(RaygunClient { inner })
	}
}

impl Default for RaygunClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// An error surfaced by an unhandled-failure source such as a panic hook,
/// together with the event's own message.
pub struct UnhandledEvent<'a> {
	/// The error being reported.
	pub error: &'a (dyn Error + 'static),
	/// Human-readable message describing the event.
	pub message: String,
}

impl<'a> UnhandledEvent<'a> {
	/// Creates an event for `error` carrying `message`.
	pub fn new(error: &'a (dyn Error + 'static), message: impl Into<String>) -> Self {
		Self {
			error,
			message: message.into(),
		}
	}
}

/// Client for reporting errors to Raygun.
///
/// # Example
///
/// ```ignore
/// use raygun::RaygunClient;
///
/// let client = RaygunClient::new("your_api_key")?;
/// client.set_user("user@example.com");
/// client.set_application_version(env!("CARGO_PKG_VERSION"));
///
/// // Report panics process-wide
/// RaygunClient::attach_client(client.clone());
///
/// // Report a handled error in the background
/// if let Err(e) = do_something() {
///     client.send(&e, Some(vec!["billing".to_string()]), None);
/// }
///
/// // Report and re-raise
/// let value = client.wrap(|| risky_operation(), None)?;
/// ```
#[derive(Clone)]
pub struct RaygunClient {
	inner: Arc<RaygunClientInner>,
}

impl RaygunClient {
	/// Creates a client that reports under `api_key`.
	///
	/// An empty key yields a working client whose sends are silently
	/// dropped, so a missing key never breaks the host application.
	pub fn new(api_key: impl Into<String>) -> Result<Self> {
		Self::builder().api_key(api_key).build()
	}

	/// Creates a client configured from `RAYGUN_*` environment variables.
	pub fn from_env() -> Result<Self> {
		Self::from_settings(RaygunSettings::from_env())
	}

	/// Creates a client from explicit settings.
	pub fn from_settings(settings: RaygunSettings) -> Result<Self> {
		Self::builder().settings(settings).build()
	}

	/// Creates a new builder for constructing a RaygunClient.
	pub fn builder() -> RaygunClientBuilder {
		RaygunClientBuilder::new()
	}

	/// Creates a client for `api_key` and attaches it to the panic hook.
	///
	/// The returned client is caller-owned; dropping it does not detach.
	pub fn attach(api_key: impl Into<String>) -> Result<Self> {
		let client = Self::new(api_key)?;
		Self::attach_client(client.clone());
		Ok(client)
	}

	/// Attaches `client` to the process-wide panic hook.
	///
	/// Panics anywhere in the process are reported through the attached
	/// client until [`detach`](Self::detach) runs. Attaching replaces any
	/// previously attached client.
	pub fn attach_client(client: RaygunClient) {
		Self::detach();

		*CURRENT.write().unwrap_or_else(|e| e.into_inner()) = Some(client);
		panic_hook::install();

		info!("Raygun attached to panic hook");
	}

	/// Detaches the attached client and restores the previous panic hook.
	///
	/// Does nothing if no client is attached.
	pub fn detach() {
		panic_hook::uninstall();

		let detached = CURRENT.write().unwrap_or_else(|e| e.into_inner()).take();
		if detached.is_some() {
			info!("Raygun detached from panic hook");
		}
	}

	/// Returns the currently attached client, if any.
	pub fn current() -> Option<RaygunClient> {
		CURRENT.read().unwrap_or_else(|e| e.into_inner()).clone()
	}

	/// Registers `E` as a wrapper type stripped from reported errors.
	///
	/// Registering the same type repeatedly has no effect.
	pub fn add_wrapper_exception<E: Error + 'static>(&self) {
		self.inner.wrapper_exceptions.add::<E>();
	}

	/// Sets the affected user attached to subsequent reports.
	pub fn set_user(&self, user: impl Into<String>) {
		*self.inner.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user.into());
	}

	/// Clears the affected user.
	pub fn clear_user(&self) {
		*self.inner.user.write().unwrap_or_else(|e| e.into_inner()) = None;
	}

	/// Returns the affected user, if set.
	pub fn user(&self) -> Option<String> {
		self.inner.user.read().unwrap_or_else(|e| e.into_inner()).clone()
	}

	/// Sets the application version attached to subsequent reports.
	pub fn set_application_version(&self, version: impl Into<String>) {
		*self
			.inner
			.application_version
			.write()
			.unwrap_or_else(|e| e.into_inner()) = Some(version.into());
	}

	/// Returns the application version, if set.
	pub fn application_version(&self) -> Option<String> {
		self.inner
			.application_version
			.read()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Reports `error` in the background.
	///
	/// Registered wrapper types are stripped before the report is built.
	/// Delivery runs on a spawned task, or on a detached thread when no
	/// runtime is available; failures are logged, never surfaced. A client
	/// without an API key drops the report.
	pub fn send(
		&self,
		error: &(dyn Error + 'static),
		tags: Option<Vec<String>>,
		user_custom_data: Option<HashMap<String, Value>>,
	) {
		if !self.validate_api_key() {
			return;
		}

		let message = self.build_report(error, tags, user_custom_data);
		self.dispatch(message);
	}

	/// Reports an error raised by an unhandled-failure source.
	///
	/// The event's message is recorded under the `Message` entry of the
	/// error's custom data, marking the report as an unhandled crash.
	pub fn send_unhandled(
		&self,
		event: UnhandledEvent<'_>,
		tags: Option<Vec<String>>,
		user_custom_data: Option<HashMap<String, Value>>,
	) {
		if !self.validate_api_key() {
			return;
		}

		let mut message = self.build_report(event.error, tags, user_custom_data);
		stamp_event_message(&mut message, event.message);
		self.dispatch(message);
	}

	/// Delivers an already-built report, awaiting the outcome.
	///
	/// Unlike [`send`](Self::send) this surfaces delivery failures when the
	/// client was configured with `throw_on_error`.
	pub async fn send_message(&self, message: RaygunMessage) -> Result<()> {
		if !self.validate_api_key() {
			return Ok(());
		}

		let outcome = self.inner.transport.deliver(&message).await;
		log_delivery_outcome(outcome, self.inner.settings.throw_on_error)
	}

	/// Runs `f`, reporting any error before handing it back to the caller.
	///
	/// The error is always re-raised; wrapping never swallows failures.
	pub fn wrap<T, E, F>(&self, f: F, tags: Option<Vec<String>>) -> std::result::Result<T, E>
	where
		E: Error + 'static,
		F: FnOnce() -> std::result::Result<T, E>,
	{
		match f() {
			Ok(value) => Ok(value),
			Err(error) => {
				self.send(&error, tags, None);
				Err(error)
			}
		}
	}

	/// Builds and delivers a panic report on the current thread.
	///
	/// Panic hooks cannot rely on a runtime being alive, so delivery uses
	/// the blocking path and failures are only logged.
	pub(crate) fn send_panic_blocking(&self, error: &(dyn Error + 'static), event_message: String) {
		if !self.validate_api_key() {
			return;
		}

		let mut message = self.build_report(error, None, None);
		stamp_event_message(&mut message, event_message);

		if let Err(e) = self.inner.transport.deliver_blocking(&message) {
			error!(error = %e, "Failed to deliver panic report");
		}
	}

	fn validate_api_key(&self) -> bool {
		if self.inner.settings.has_api_key() {
			true
		} else {
			debug!("API key has not been provided, report will not be sent");
			false
		}
	}

	fn build_report(
		&self,
		error: &(dyn Error + 'static),
		tags: Option<Vec<String>>,
		user_custom_data: Option<HashMap<String, Value>>,
	) -> RaygunMessage {
		let error = strip_wrapper_exceptions(error, &self.inner.wrapper_exceptions);

		RaygunMessageBuilder::new()
			.set_environment_details()
			.set_machine_name(System::host_name())
			.set_error_details(error)
			.set_client_details()
			.set_version(self.application_version())
			.set_tags(tags)
			.set_user_custom_data(user_custom_data)
			.set_user(self.user())
			.build()
	}

	/// Hands `message` to the transport without waiting for the outcome.
	fn dispatch(&self, message: RaygunMessage) {
		let transport = Arc::clone(&self.inner.transport);
		let throw_on_error = self.inner.settings.throw_on_error;

		match Handle::try_current() {
			Ok(handle) => {
				handle.spawn(async move {
					log_delivery_outcome(transport.deliver(&message).await, throw_on_error)
				});
			}
			Err(_) => {
				std::thread::spawn(move || {
					log_delivery_outcome(transport.deliver_blocking(&message), throw_on_error)
				});
			}
		}
	}
}

/// Records the originating event's message in the report's error data.
fn stamp_event_message(message: &mut RaygunMessage, event_message: String) {
	if let Some(error) = message.details.error.as_mut() {
		error
			.data
			.get_or_insert_with(HashMap::new)
			.insert(EVENT_MESSAGE_KEY.to_string(), Value::String(event_message));
	}
}

/// Logs a delivery failure, surfacing it only when `throw_on_error` is set.
fn log_delivery_outcome(outcome: Result<()>, throw_on_error: bool) -> Result<()> {
	match outcome {
		Ok(()) => Ok(()),
		Err(e) => {
			error!(error = %e, "Failed to deliver crash report");
			if throw_on_error {
				Err(e)
			} else {
				Ok(())
			}
		}
	}
}
