// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tk-sync: Optimistic client-side synchronization for the tick list.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  Command   ┌─────────────┐   HTTP    ┌─────────────┐
//! │   Engine    │──────────► │  RemoteApi  │─────────► │             │
//! │ (sans I/O)  │◄────────── │  (HttpApi)  │◄───────── │  Authority  │
//! └─────────────┘  Outcome   └─────────────┘           │             │
//!        ▲                                             │             │
//!        │ ChannelEvent ┌──────────────────┐ frames    │             │
//!        └──────────────│ BroadcastChannel │◄───────── │             │
//!                       └──────────────────┘ WebSocket └─────────────┘
//! ```
//!
//! The [`Session`] owns the engine and runs it on one task; everything else
//! talks to it through a [`SessionHandle`].

pub mod api;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod transport;

pub use api::{HttpApi, RemoteApi};
pub use channel::{Backoff, BroadcastChannel, ChannelEvent, ReconnectPolicy, Timer, TokioTimer};
pub use config::SyncConfig;
pub use engine::{Dispatched, Engine, Intent, IntentId, Phase, Snapshot};
pub use error::{ApiError, ApiErrorKind, EngineError, SyncError, SyncResult};
pub use session::{Session, SessionHandle, Subscription, SyncClient};
pub use transport::{BroadcastTransport, WebSocketTransport};

#[cfg(test)]
mod test_helpers;
