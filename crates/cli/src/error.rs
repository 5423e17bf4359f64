// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

/// All errors the `tick` binary reports.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] tk_sync::SyncError),

    #[error(transparent)]
    Core(#[from] tk_core::Error),

    #[error("config file not found: {}\n  hint: check --config or $TICK_CONFIG", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("item not found: {0}")]
    ItemNotFound(i64),

    #[error("unknown command: '{0}'\n  hint: try add, toggle, rm, filter, retry, dismiss or quit")]
    UnknownCommand(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tk_sync::ApiError> for Error {
    fn from(err: tk_sync::ApiError) -> Self {
        Error::Sync(err.into())
    }
}

impl From<tk_sync::EngineError> for Error {
    fn from(err: tk_sync::EngineError) -> Self {
        Error::Sync(err.into())
    }
}

/// A specialized Result type for tick operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
