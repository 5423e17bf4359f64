// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tk-sync.
//!
//! Remote failures keep their kind tag ([`ApiErrorKind`]) all the way into
//! the engine's error state so logs can tell them apart, even though the
//! engine rolls back the same way for every kind.

use std::fmt;

use thiserror::Error;

/// Classification of a failed remote exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Transport failure: connection refused, reset, or timed out.
    Network,
    /// The payload could not be decoded or did not fit the schema.
    Protocol,
    /// A well-formed response that signals a logical failure.
    Server,
}

impl ApiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorKind::Network => "network",
            ApiErrorKind::Protocol => "protocol",
            ApiErrorKind::Server => "server",
        }
    }
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed remote exchange: kind tag plus an opaque reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Protocol, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Server, message)
    }
}

impl From<tk_core::Error> for ApiError {
    fn from(err: tk_core::Error) -> Self {
        ApiError::protocol(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::network(format!("request timed out: {err}"))
        } else {
            ApiError::network(err.to_string())
        }
    }
}

/// Result type for remote API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Reasons the engine refuses an intent without sending anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A local precondition failed; nothing was applied or sent.
    #[error("invalid intent: {0}")]
    Validation(String),

    /// The engine is in its error state and needs `retry` or `dismiss`.
    #[error("cannot accept intents in the {phase} state\n  hint: retry or dismiss the current error first")]
    Blocked { phase: String },
}

/// All errors surfaced by the sync client.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("sync session has shut down")]
    SessionClosed,
}

/// Result type for sync client operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
