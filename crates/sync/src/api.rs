// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response access to the authority.
//!
//! Every body is a protobuf message sent as `application/x-protobuf`.
//! Failures are classified by [`ApiErrorKind`](crate::error::ApiErrorKind):
//! - Network: the request never produced a response
//! - Server: non-2xx status, or an `ApiResponse` with `success = false`
//! - Protocol: the body could not be decoded

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode, Url};
use tk_core::protocol::{self, Envelope};
use tk_core::{Item, Reply, Stats};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{ApiError, ApiResult, SyncResult};

/// Media type of every request and response body.
pub const PROTOBUF: &str = "application/x-protobuf";

/// Boxed future returned by [`RemoteApi`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// The five remote operations the client needs.
///
/// Each call is a single exchange with no retry; the caller decides what a
/// failure means.
pub trait RemoteApi: Send + Sync {
    /// Full list (newest first) plus current stats.
    fn list(&self) -> ApiFuture<'_, (Vec<Item>, Stats)>;

    fn create(&self, title: &str) -> ApiFuture<'_, Reply<Item>>;

    /// Sets the completion flag of `id` to `completed`.
    fn toggle(&self, id: i64, completed: bool) -> ApiFuture<'_, Reply<Item>>;

    /// Deletes `id`. The value is whether the authority acknowledged it.
    fn delete(&self, id: i64) -> ApiFuture<'_, Reply<bool>>;

    fn stats(&self) -> ApiFuture<'_, Stats>;
}

/// [`RemoteApi`] over HTTP using reqwest.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Creates a client for the authority rooted at `base`.
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    /// Creates a client for `config.server` that gives up on any single
    /// request after the configured timeout.
    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ApiError::from)?;
        Ok(Self::with_client(client, config.server_url()?))
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        HttpApi { client, base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ApiError::network(format!("invalid endpoint {path}: {e}")))
    }

    /// Performs one exchange and returns the body of a 2xx response.
    async fn exchange(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(path)?;
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).header(ACCEPT, PROTOBUF);
        if let Some(body) = body {
            request = request.header(CONTENT_TYPE, PROTOBUF).body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        check_status(status, &bytes)?;
        Ok(bytes.to_vec())
    }
}

impl RemoteApi for HttpApi {
    fn list(&self) -> ApiFuture<'_, (Vec<Item>, Stats)> {
        Box::pin(async move {
            let (items, stats) = tokio::try_join!(
                async {
                    let body = self.exchange(Method::GET, "api/todos", None).await?;
                    Ok::<_, ApiError>(protocol::decode_items(&body)?)
                },
                self.stats(),
            )?;
            Ok((items, stats))
        })
    }

    fn create(&self, title: &str) -> ApiFuture<'_, Reply<Item>> {
        let body = protocol::create_request(title);
        Box::pin(async move {
            let bytes = self.exchange(Method::POST, "api/todos", Some(body)).await?;
            item_reply(&bytes)
        })
    }

    fn toggle(&self, id: i64, completed: bool) -> ApiFuture<'_, Reply<Item>> {
        Box::pin(async move {
            let path = format!("api/todos/{id}/toggle");
            let body = protocol::update_request(completed);
            let bytes = self.exchange(Method::PUT, &path, Some(body)).await?;
            item_reply(&bytes)
        })
    }

    fn delete(&self, id: i64) -> ApiFuture<'_, Reply<bool>> {
        Box::pin(async move {
            let path = format!("api/todos/{id}");
            let bytes = self.exchange(Method::DELETE, &path, None).await?;
            delete_reply(&bytes)
        })
    }

    fn stats(&self) -> ApiFuture<'_, Stats> {
        Box::pin(async move {
            let bytes = self.exchange(Method::GET, "api/stats", None).await?;
            stats_reply(&bytes)
        })
    }
}

/// Maps a non-2xx status to a server error.
///
/// If the body is a rejected `ApiResponse`, its message is kept.
pub(crate) fn check_status(status: StatusCode, body: &[u8]) -> ApiResult<()> {
    if status.is_success() {
        return Ok(());
    }
    let detail = match Envelope::decode(body) {
        Ok(Envelope::Rejected { message }) if !body.is_empty() => format!(": {message}"),
        _ => String::new(),
    };
    Err(ApiError::server(format!("HTTP {status}{detail}")))
}

fn accepted(body: &[u8]) -> ApiResult<(Option<Item>, Option<Stats>)> {
    match Envelope::decode(body)? {
        Envelope::Accepted { item, stats, .. } => Ok((item, stats)),
        Envelope::Rejected { message } => Err(ApiError::server(message)),
    }
}

pub(crate) fn item_reply(body: &[u8]) -> ApiResult<Reply<Item>> {
    let (item, stats) = accepted(body)?;
    let item = item.ok_or_else(|| ApiError::protocol("response carries no item"))?;
    Ok(Reply::new(item, stats))
}

pub(crate) fn delete_reply(body: &[u8]) -> ApiResult<Reply<bool>> {
    let (_, stats) = accepted(body)?;
    Ok(Reply::new(true, stats))
}

pub(crate) fn stats_reply(body: &[u8]) -> ApiResult<Stats> {
    let (_, stats) = accepted(body)?;
    stats.ok_or_else(|| ApiError::protocol("response carries no stats"))
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
