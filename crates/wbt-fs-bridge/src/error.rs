// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Bridge error types and their wire representation

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::io;

/// Bridge result type
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error codes exposed on the wire.
///
/// Only a missing path is distinguished. Every other OS failure (permission
/// denied, I/O error, bad descriptor, ...) collapses into `Generic`; the page
/// runtime is not known to depend on finer codes, so the underlying error is
/// logged and not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "ENOSYS")]
    Generic,
    #[serde(rename = "ENOENT")]
    NotFound,
}

/// Structured error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub code: ErrorCode,
}

impl ErrorEnvelope {
    pub fn not_implemented() -> Self {
        Self {
            error: "not implemented".to_string(),
            code: ErrorCode::Generic,
        }
    }

    pub fn function_not_implemented() -> Self {
        Self {
            error: "function not implemented".to_string(),
            code: ErrorCode::Generic,
        }
    }

    pub fn not_found() -> Self {
        Self {
            error: "no such file or directory".to_string(),
            code: ErrorCode::NotFound,
        }
    }
}

/// Bridge error types
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("missing or mismatched capability token")]
    Unauthorized,

    #[error("unsupported api path {0:?}")]
    UnknownOperation(String),

    #[error("invalid request body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{operation} offset {offset} not supported")]
    UnsupportedOffset { operation: &'static str, offset: i64 },

    #[error("invalid buffer encoding: {0}")]
    InvalidBuffer(#[from] base64::DecodeError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(#[source] io::Error),

    #[error("os error: {0}")]
    Os(#[from] io::Error),

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Classify a syscall failure.
    ///
    /// `reports_not_found` is set only for operations whose callers branch on
    /// a missing path; everything else is a generic failure.
    pub fn from_os(err: io::Error, reports_not_found: bool) -> Self {
        if reports_not_found && err.kind() == io::ErrorKind::NotFound {
            BridgeError::NotFound(err)
        } else {
            BridgeError::Os(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BridgeError::Encode(_) | BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Body sent with this error; `None` means a bare status code
    pub fn envelope(&self) -> Option<ErrorEnvelope> {
        match self {
            BridgeError::Decode(_) | BridgeError::Encode(_) | BridgeError::Internal(_) => None,
            BridgeError::NotFound(_) => Some(ErrorEnvelope::not_found()),
            BridgeError::Os(_) => Some(ErrorEnvelope::function_not_implemented()),
            BridgeError::Unauthorized
            | BridgeError::UnknownOperation(_)
            | BridgeError::UnsupportedOffset { .. }
            | BridgeError::InvalidBuffer(_)
            | BridgeError::InvalidArgument(_) => Some(ErrorEnvelope::not_implemented()),
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.envelope() {
            Some(envelope) => (status, Json(envelope)).into_response(),
            None => status.into_response(),
        }
    }
}
