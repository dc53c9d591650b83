// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Raygun crash reporting client for Rust.
//!
//! This crate reports application errors and panics to the Raygun ingestion
//! API. Reports are built from any [`std::error::Error`] value, enriched with
//! host details and a captured stack trace, and posted in the background so
//! the host application never waits on the network.
//!
//! # Overview
//!
//! - Background delivery: `send` hands the report to a spawned task (or a
//!   detached thread when no runtime is running) and returns immediately
//! - Wrapper stripping: registered carrier error types are unwrapped so
//!   reports group on the real cause
//! - Panic reporting: [`RaygunClient::attach`] installs a process-wide panic
//!   hook that reports through the attached client until detached
//! - Soft failure: a client without an API key drops reports instead of
//!   breaking the host application
//!
//! # Example
//!
//! ```ignore
//! use raygun::RaygunClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RaygunClient::attach("your_api_key")?;
//!     client.set_application_version(env!("CARGO_PKG_VERSION"));
//!
//!     if let Err(e) = run().await {
//!         client.send(&e, Some(vec!["startup".to_string()]), None);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod backtrace;
pub mod builder;
pub mod client;
pub mod error;
mod panic_hook;
pub mod settings;
pub mod transport;
pub mod wrapper;

pub use backtrace::capture_stack_trace;
pub use builder::RaygunMessageBuilder;
pub use client::{RaygunClient, RaygunClientBuilder, UnhandledEvent};
pub use error::{RaygunError, Result};
pub use raygun_core::{
	RaygunClientMessage, RaygunEnvironmentMessage, RaygunErrorMessage, RaygunMessage,
	RaygunMessageDetails, RaygunStackTraceLine,
};
pub use settings::{RaygunSettings, DEFAULT_ENDPOINT};
pub use transport::{HttpTransport, Transport};
pub use wrapper::{strip_wrapper_exceptions, WrapperExceptions};
