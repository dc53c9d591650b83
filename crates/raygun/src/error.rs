// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the Raygun SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, RaygunError>;

/// Errors that can occur while delivering a crash report.
#[derive(Debug, Error)]
pub enum RaygunError {
	/// HTTP request failed at the transport level.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Failed to serialize the report payload.
	#[error("serialization error: {0}")]
	SerializationError(#[from] serde_json::Error),
}
