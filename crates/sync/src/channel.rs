// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Broadcast channel: keeps a transport connected and decodes its frames.
//!
//! ```text
//!   connecting ──ok──► live ──closed/error──► reconnecting
//!       ▲  │                                       │
//!       │  └──────────── failed ──────────────────►│
//!       └──────────────── after delay ─────────────┘
//! ```
//!
//! Reconnection never gives up. The channel stops only when cancelled or
//! when nobody is listening for its events any more.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tk_core::{Broadcast, ConnectionStatus};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::transport::BroadcastTransport;

/// What the channel reports to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Status(ConnectionStatus),
    Broadcast(Broadcast),
}

/// How the delay between reconnect attempts evolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay every time.
    Fixed,
    /// Delay doubles per failed attempt, capped at `max_delay`.
    Exponential { max_delay: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            delay: Duration::from_secs(1),
            backoff: Backoff::Fixed,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (0 for the first retry).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { max_delay } => {
                let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
                self.delay.saturating_mul(factor).min(max_delay)
            }
        }
    }
}

/// Source of reconnect delays.
pub trait Timer: Send + Sync {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// [`Timer`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Keeps one broadcast connection alive and forwards decoded events.
pub struct BroadcastChannel<T, C = TokioTimer> {
    transport: T,
    timer: C,
    url: String,
    policy: ReconnectPolicy,
}

impl<T: BroadcastTransport> BroadcastChannel<T, TokioTimer> {
    pub fn new(transport: T, url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self::with_timer(transport, TokioTimer, url, policy)
    }
}

impl<T: BroadcastTransport, C: Timer> BroadcastChannel<T, C> {
    pub fn with_timer(transport: T, timer: C, url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        BroadcastChannel {
            transport,
            timer,
            url: url.into(),
            policy,
        }
    }

    /// Runs until `cancel` fires or `events` is closed.
    pub async fn run(mut self, events: UnboundedSender<ChannelEvent>, cancel: CancellationToken) {
        tokio::select! {
            _ = cancel.cancelled() => debug!("broadcast channel cancelled"),
            _ = self.cycle(&events) => debug!("broadcast listener gone"),
        }
        let _ = self.transport.disconnect().await;
    }

    async fn cycle(&mut self, events: &UnboundedSender<ChannelEvent>) {
        let mut attempt: u32 = 0;
        loop {
            if events.send(ChannelEvent::Status(ConnectionStatus::Connecting)).is_err() {
                return;
            }

            match self.transport.connect(&self.url).await {
                Ok(()) => {
                    info!("broadcast channel connected to {}", self.url);
                    attempt = 0;
                    if events.send(ChannelEvent::Status(ConnectionStatus::Live)).is_err() {
                        return;
                    }
                    if !self.pump(events).await {
                        return;
                    }
                }
                Err(e) => warn!("broadcast connect to {} failed: {}", self.url, e),
            }

            if events.send(ChannelEvent::Status(ConnectionStatus::Reconnecting)).is_err() {
                return;
            }
            let delay = self.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            debug!(attempt, "reconnecting in {:?}", delay);
            self.timer.sleep(delay).await;
        }
    }

    /// Forwards frames until the connection ends. Returns false if the
    /// receiver has been dropped.
    async fn pump(&mut self, events: &UnboundedSender<ChannelEvent>) -> bool {
        loop {
            match self.transport.recv().await {
                Ok(Some(frame)) => match Broadcast::decode(&frame) {
                    Ok(broadcast) => {
                        if events.send(ChannelEvent::Broadcast(broadcast)).is_err() {
                            return false;
                        }
                    }
                    Err(e) => warn!("dropping malformed broadcast frame ({} bytes): {}", frame.len(), e),
                },
                Ok(None) => {
                    info!("broadcast connection closed by peer");
                    return true;
                }
                Err(e) => {
                    warn!("broadcast connection lost: {}", e);
                    return true;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
