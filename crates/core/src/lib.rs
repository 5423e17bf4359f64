// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tk-core: Shared data model and wire codec for the tick list client.
//!
//! This crate provides the replica data types, the protobuf messages
//! exchanged with the authority, and the strict decoding that turns those
//! messages into domain values.

pub mod error;
pub mod model;
pub mod protocol;
pub mod wire;

pub use error::{Error, Result};
pub use model::{ConnectionStatus, Filter, Item, Stats};
pub use protocol::{Broadcast, Reply};
