// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for the sync crate.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tk_core::{Broadcast, Item, Stats};
use tokio::sync::mpsc;

use crate::transport::{BroadcastTransport, TransportError, TransportFuture};

pub fn item(id: i64, title: &str, completed: bool) -> Item {
    Item::new(id, title, completed, 1_700_000_000 + id)
}

pub fn created_frame(id: i64, title: &str, stats: Stats) -> Vec<u8> {
    Broadcast::created(item(id, title, false), stats).encode()
}

/// How a scripted connection ends once its frames are exhausted.
#[derive(Debug, Clone, Copy)]
pub enum End {
    /// Peer closes cleanly.
    Close,
    /// The socket breaks.
    Error,
    /// Stays open and silent.
    Hold,
}

/// One scripted connection attempt.
pub enum Scripted {
    Refuse,
    Frames(Vec<Vec<u8>>, End),
    /// Frames are pushed by the test; dropping the sender closes the connection.
    Live(mpsc::UnboundedReceiver<Vec<u8>>),
}

enum Active {
    Frames(VecDeque<Vec<u8>>, End),
    Live(mpsc::UnboundedReceiver<Vec<u8>>),
}

/// Mock transport that plays back one [`Scripted`] entry per `connect`.
///
/// Once the script runs out, `connect` never completes.
pub struct MockTransport {
    script: VecDeque<Scripted>,
    active: Option<Active>,
    connects: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new(script: Vec<Scripted>) -> Self {
        MockTransport {
            script: script.into(),
            active: None,
            connects: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared log of URLs passed to `connect`.
    pub fn connects(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.connects)
    }
}

impl BroadcastTransport for MockTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        self.connects.lock().unwrap().push(url.to_string());
        let next = self.script.pop_front();
        Box::pin(async move {
            match next {
                None => std::future::pending().await,
                Some(Scripted::Refuse) => {
                    Err(TransportError::ConnectionFailed("connection refused".into()))
                }
                Some(Scripted::Frames(frames, end)) => {
                    self.active = Some(Active::Frames(frames.into(), end));
                    Ok(())
                }
                Some(Scripted::Live(rx)) => {
                    self.active = Some(Active::Live(rx));
                    Ok(())
                }
            }
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<Vec<u8>>> {
        Box::pin(async move {
            let active = self.active.as_mut().ok_or(TransportError::NotConnected)?;
            let next = match active {
                Active::Frames(frames, end) => match frames.pop_front() {
                    Some(frame) => return Ok(Some(frame)),
                    None => *end,
                },
                Active::Live(rx) => match rx.recv().await {
                    Some(frame) => return Ok(Some(frame)),
                    None => End::Close,
                },
            };
            match next {
                End::Close => {
                    self.active = None;
                    Ok(None)
                }
                End::Error => {
                    self.active = None;
                    Err(TransportError::ReceiveFailed("connection reset".into()))
                }
                End::Hold => std::future::pending().await,
            }
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.active = None;
            Ok(())
        })
    }

    fn is_connected(&self) -> bool {
        self.active.is_some()
    }
}
