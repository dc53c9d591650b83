// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire-format types for the Raygun crash reporting API.
//!
//! This crate holds the passive payload model that the Raygun ingestion
//! endpoint accepts: one [`RaygunMessage`] per error occurrence, carrying the
//! error itself plus host, environment and client metadata. Field names are
//! PascalCase on the wire, and every optional section is omitted entirely
//! when absent rather than serialized as null or an empty placeholder.
//!
//! Report assembly and HTTP delivery live in the `raygun` SDK crate; nothing
//! in this crate performs I/O.

pub mod environment;
pub mod error;
pub mod message;

pub use environment::RaygunEnvironmentMessage;
pub use error::{RaygunErrorMessage, RaygunStackTraceLine};
pub use message::{RaygunClientMessage, RaygunMessage, RaygunMessageDetails};
