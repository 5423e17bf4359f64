// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tk-core operations.

use thiserror::Error;

/// Errors raised by the data model and wire codec.
///
/// `Decode` and `Schema` are protocol errors: the bytes either were not
/// valid protobuf, or decoded into a message that does not fit the schema.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed payload: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("invalid filter: '{0}'\n  hint: valid filters are: all, active, completed")]
    InvalidFilter(String),
}

impl Error {
    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Error::Schema(message.into())
    }
}

/// A specialized Result type for tk-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
