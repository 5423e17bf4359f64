// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session driver: runs the engine against a real API and broadcast channel.
//!
//! ```text
//!  SessionHandle ──requests──┐
//!                            ▼
//!  BroadcastChannel ──events──► Session (one task, owns Engine)
//!                            ▲            │ Command
//!  API tasks ───results──────┘            ▼
//!                                  spawned RemoteApi call
//! ```
//!
//! Every input is handled to completion before the next one is looked at,
//! so the engine never sees interleaved transitions.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::Stream;
use tk_core::{Filter, Reply};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{HttpApi, RemoteApi};
use crate::channel::{BroadcastChannel, ChannelEvent};
use crate::config::SyncConfig;
use crate::engine::{Command, Dispatched, Engine, Intent, IntentId, Outcome, Snapshot};
use crate::error::{ApiError, EngineError, SyncError, SyncResult};
use crate::transport::{BroadcastTransport, WebSocketTransport};

enum Request {
    Dispatch(Intent, oneshot::Sender<Result<Dispatched, EngineError>>),
    SetFilter(Filter),
    Retry,
    Dismiss,
    Subscribe(mpsc::UnboundedSender<Snapshot>),
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

type Resolved = (IntentId, Result<Outcome, ApiError>);

/// Cloneable front door to a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<Request>,
}

impl SessionHandle {
    fn send(&self, request: Request) -> SyncResult<()> {
        self.requests
            .send(request)
            .map_err(|_| SyncError::SessionClosed)
    }

    /// Hands an intent to the engine and returns its verdict.
    ///
    /// Resolves as soon as the intent is sent or queued, not when the
    /// authority answers; watch a [`Subscription`] for the outcome.
    pub async fn dispatch(&self, intent: Intent) -> SyncResult<Dispatched> {
        let (tx, rx) = oneshot::channel();
        self.send(Request::Dispatch(intent, tx))?;
        let verdict = rx.await.map_err(|_| SyncError::SessionClosed)?;
        Ok(verdict?)
    }

    pub fn set_filter(&self, filter: Filter) -> SyncResult<()> {
        self.send(Request::SetFilter(filter))
    }

    pub fn retry(&self) -> SyncResult<()> {
        self.send(Request::Retry)
    }

    pub fn dismiss(&self) -> SyncResult<()> {
        self.send(Request::Dismiss)
    }

    /// Streams a snapshot now and after every committed transition.
    pub fn subscribe(&self) -> SyncResult<Subscription> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.send(Request::Subscribe(tx))?;
        Ok(Subscription { rx })
    }

    pub async fn snapshot(&self) -> SyncResult<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Request::Snapshot(tx))?;
        rx.await.map_err(|_| SyncError::SessionClosed)
    }

    /// Asks the session to stop. In-flight responses are abandoned.
    pub fn shutdown(&self) -> SyncResult<()> {
        self.send(Request::Shutdown)
    }
}

/// Snapshots pushed by the session. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Waits for the next snapshot; `None` once the session has stopped.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Waits for the first snapshot matching `predicate`.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&Snapshot) -> bool) -> Option<Snapshot> {
        while let Some(snapshot) = self.rx.recv().await {
            if predicate(&snapshot) {
                return Some(snapshot);
            }
        }
        None
    }
}

impl Stream for Subscription {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        self.rx.poll_recv(cx)
    }
}

/// Owns the engine and serializes everything that touches it.
pub struct Session {
    engine: Engine,
    api: Arc<dyn RemoteApi>,
    timeout: Duration,
    requests: mpsc::UnboundedReceiver<Request>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    results_tx: mpsc::UnboundedSender<Resolved>,
    results: mpsc::UnboundedReceiver<Resolved>,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        timeout: Duration,
        events: mpsc::UnboundedReceiver<ChannelEvent>,
        cancel: CancellationToken,
    ) -> (Self, SessionHandle) {
        let (requests_tx, requests) = mpsc::unbounded_channel();
        let (results_tx, results) = mpsc::unbounded_channel();
        let session = Session {
            engine: Engine::new(),
            api,
            timeout,
            requests,
            events,
            results_tx,
            results,
            cancel,
        };
        (session, SessionHandle { requests: requests_tx })
    }

    /// Runs until shut down, cancelled, or every handle is dropped.
    pub async fn run(mut self) {
        if let Some(command) = self.engine.start() {
            self.execute(command);
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                request = self.requests.recv() => match request {
                    Some(Request::Shutdown) | None => break,
                    Some(request) => self.handle(request),
                },
                Some(event) = self.events.recv() => match event {
                    ChannelEvent::Status(status) => {
                        if let Some(command) = self.engine.set_connection(status) {
                            self.execute(command);
                        }
                    }
                    ChannelEvent::Broadcast(broadcast) => self.engine.apply_broadcast(broadcast),
                },
                Some((ticket, result)) = self.results.recv() => {
                    if let Some(command) = self.engine.resolve(ticket, result) {
                        self.execute(command);
                    }
                }
            }
        }

        info!("sync session stopped");
        self.cancel.cancel();
    }

    fn handle(&mut self, request: Request) {
        match request {
            Request::Dispatch(intent, reply) => {
                let verdict = self.engine.dispatch(intent);
                if let Ok(Dispatched::Sent(command)) = &verdict {
                    self.execute(command.clone());
                }
                let _ = reply.send(verdict);
            }
            Request::SetFilter(filter) => self.engine.set_filter(filter),
            Request::Retry => {
                if let Some(command) = self.engine.retry() {
                    self.execute(command);
                }
            }
            Request::Dismiss => {
                if let Some(command) = self.engine.dismiss() {
                    self.execute(command);
                }
            }
            Request::Subscribe(tx) => {
                self.engine
                    .subscribe(Box::new(move |snapshot| tx.send(snapshot.clone()).is_ok()));
            }
            Request::Snapshot(reply) => {
                let _ = reply.send(self.engine.snapshot());
            }
            Request::Shutdown => {}
        }
    }

    fn execute(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let results = self.results_tx.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            let ticket = command.ticket();
            let result = perform(api.as_ref(), command, timeout).await;
            let _ = results.send((ticket, result));
        });
    }
}

/// Runs one command against the API.
///
/// Mutations whose response carried no stats are followed by a stats
/// fetch; if that fails the mutation still succeeds without stats.
async fn perform(api: &dyn RemoteApi, command: Command, timeout: Duration) -> Result<Outcome, ApiError> {
    debug!("executing {:?}", command);
    let outcome = match command {
        Command::Load { .. } => {
            let (items, stats) = bounded(timeout, api.list()).await?;
            Outcome::Loaded { items, stats }
        }
        Command::Create { title, .. } => {
            let reply = bounded(timeout, api.create(&title)).await?;
            Outcome::Created(with_stats(api, timeout, reply).await)
        }
        Command::Toggle { id, completed, .. } => {
            let reply = bounded(timeout, api.toggle(id, completed)).await?;
            Outcome::Toggled(with_stats(api, timeout, reply).await)
        }
        Command::Delete { id, .. } => {
            let reply = bounded(timeout, api.delete(id)).await?;
            Outcome::Deleted(with_stats(api, timeout, reply).await)
        }
    };
    Ok(outcome)
}

async fn with_stats<T>(api: &dyn RemoteApi, timeout: Duration, mut reply: Reply<T>) -> Reply<T> {
    if reply.stats.is_none() {
        match bounded(timeout, api.stats()).await {
            Ok(stats) => reply.stats = Some(stats),
            Err(e) => warn!(kind = %e.kind, "stats refresh failed: {}", e.message),
        }
    }
    reply
}

async fn bounded<T>(
    timeout: Duration,
    call: impl std::future::Future<Output = Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ApiError::network(format!("request timed out after {}ms", timeout.as_millis())))?
}

/// A running session plus its broadcast channel.
pub struct SyncClient {
    handle: SessionHandle,
    cancel: CancellationToken,
    session: JoinHandle<()>,
    channel: JoinHandle<()>,
}

impl SyncClient {
    /// Connects to the authority described by `config` over HTTP and WebSocket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        let api = HttpApi::from_config(config)?;
        Self::with_parts(config, Arc::new(api), WebSocketTransport::new())
    }

    /// Starts with a custom API and transport (for testing).
    pub fn with_parts<T>(config: &SyncConfig, api: Arc<dyn RemoteApi>, transport: T) -> SyncResult<Self>
    where
        T: BroadcastTransport + 'static,
    {
        let url = config.broadcast_url()?;
        let cancel = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let channel = BroadcastChannel::new(transport, url.as_str(), config.reconnect_policy());
        let channel = tokio::spawn(channel.run(events_tx, cancel.clone()));

        let (session, handle) = Session::new(api, config.request_timeout(), events_rx, cancel.clone());
        let session = tokio::spawn(session.run());

        info!("sync client started for {}", config.server);
        Ok(SyncClient {
            handle,
            cancel,
            session,
            channel,
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Stops the session and the channel and waits for both.
    pub async fn shutdown(self) {
        let _ = self.handle.shutdown();
        self.cancel.cancel();
        let _ = self.session.await;
        let _ = self.channel.await;
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
