// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the broadcast stream.
//!
//! The stream is receive-only: the authority pushes one binary frame per
//! change event and never expects anything back.

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Boxed future returned by [`BroadcastTransport`] methods.
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A connection that yields raw broadcast frames.
pub trait BroadcastTransport: Send {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()>;

    /// Waits for the next binary frame.
    ///
    /// Returns `None` once the peer closes the connection.
    fn recv(&mut self) -> TransportFuture<'_, Option<Vec<u8>>>;

    fn disconnect(&mut self) -> TransportFuture<'_, ()>;

    fn is_connected(&self) -> bool;
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
#[derive(Default)]
pub struct WebSocketTransport {
    sink: Option<futures_util::stream::SplitSink<Socket, Message>>,
    stream: Option<SplitStream<Socket>>,
}

impl WebSocketTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear(&mut self) {
        self.sink = None;
        self.stream = None;
    }
}

impl BroadcastTransport for WebSocketTransport {
    fn connect(&mut self, url: &str) -> TransportFuture<'_, ()> {
        let url = url.to_string();
        Box::pin(async move {
            let (socket, _) = tokio_tungstenite::connect_async(&url)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = socket.split();
            self.sink = Some(sink);
            self.stream = Some(stream);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<Vec<u8>>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;

            loop {
                match stream.next().await {
                    Some(Ok(Message::Binary(bytes))) => return Ok(Some(bytes.to_vec())),
                    Some(Ok(Message::Close(_))) | None => {
                        self.clear();
                        return Ok(None);
                    }
                    // Text, ping and pong carry no events; tungstenite answers pings itself.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        self.clear();
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                }
            }
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if let Some(mut sink) = self.sink.take() {
                let _ = sink.close().await;
            }
            self.stream = None;
            Ok(())
        })
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
