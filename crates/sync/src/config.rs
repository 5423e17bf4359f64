// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync client configuration.
//!
//! Stored as TOML; every field has a default so an empty file is valid:
//!
//! ```toml
//! server = "http://127.0.0.1:8080"
//! broadcast_path = "/ws"
//! request_timeout_ms = 30000
//!
//! [reconnect]
//! delay_ms = 1000
//! backoff = "fixed"        # or "exponential"
//! max_delay_ms = 30000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::channel::{Backoff, ReconnectPolicy};
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Authority base URL (http or https).
    #[serde(default = "default_server")]
    pub server: String,
    /// Path of the broadcast endpoint on the same host.
    #[serde(default = "default_broadcast_path")]
    pub broadcast_path: String,
    /// Upper bound for a single request/response exchange.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Cap for exponential backoff; ignored when fixed.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

fn default_server() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_broadcast_path() -> String {
    "/ws".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            delay_ms: default_delay_ms(),
            backoff: BackoffKind::default(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            server: default_server(),
            broadcast_path: default_broadcast_path(),
            request_timeout_ms: default_request_timeout_ms(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Default config pointed at another server.
    pub fn for_server(server: impl Into<String>) -> Self {
        SyncConfig {
            server: server.into(),
            ..Self::default()
        }
    }

    /// Reads and validates a config file.
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SyncResult<Self> {
        let config: SyncConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        self.server_url()?;
        if !self.broadcast_path.starts_with('/') {
            return Err(SyncError::Config(format!(
                "broadcast_path '{}' must start with '/'",
                self.broadcast_path
            )));
        }
        if self.request_timeout_ms == 0 {
            return Err(SyncError::Config("request_timeout_ms must be positive".into()));
        }
        if self.reconnect.delay_ms == 0 {
            return Err(SyncError::Config("reconnect.delay_ms must be positive".into()));
        }
        if self.reconnect.backoff == BackoffKind::Exponential
            && self.reconnect.max_delay_ms < self.reconnect.delay_ms
        {
            return Err(SyncError::Config(
                "reconnect.max_delay_ms must not be below reconnect.delay_ms".into(),
            ));
        }
        Ok(())
    }

    /// The server URL, normalized with a trailing slash so relative
    /// endpoints resolve beneath it.
    pub fn server_url(&self) -> SyncResult<Url> {
        let mut url = Url::parse(&self.server)
            .map_err(|e| SyncError::Config(format!("invalid server URL '{}': {}", self.server, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SyncError::Config(format!(
                "server URL '{}' must use http or https",
                self.server
            )));
        }
        if url.host_str().is_none() {
            return Err(SyncError::Config(format!("server URL '{}' has no host", self.server)));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Resolves an API path (e.g. `api/todos`) against the server URL.
    pub fn api_url(&self, path: &str) -> SyncResult<Url> {
        self.server_url()?
            .join(path.trim_start_matches('/'))
            .map_err(|e| SyncError::Config(format!("invalid API path '{path}': {e}")))
    }

    /// Broadcast endpoint: same host, `ws` for `http` and `wss` for `https`.
    pub fn broadcast_url(&self) -> SyncResult<Url> {
        let mut url = self.server_url()?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| SyncError::Config(format!("cannot derive {scheme} URL from '{}'", self.server)))?;
        url.set_path(&self.broadcast_path);
        url.set_query(None);
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        let backoff = match self.reconnect.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
            },
        };
        ReconnectPolicy {
            delay: Duration::from_millis(self.reconnect.delay_ms),
            backoff,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
