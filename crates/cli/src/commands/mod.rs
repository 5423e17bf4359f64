// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod lifecycle;
pub mod list;
pub mod stats;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use tk_core::Item;
use tk_sync::{HttpApi, RemoteApi, SyncConfig};

use crate::error::{Error, Result};

/// Opens a one-shot HTTP client for the configured server.
pub fn open_api(config: &SyncConfig) -> Result<HttpApi> {
    Ok(HttpApi::from_config(config)?)
}

/// Fetches the list and returns the item with `id`.
pub(crate) async fn find_item(api: &dyn RemoteApi, id: i64) -> Result<Item> {
    let (items, _) = api.list().await?;
    items
        .into_iter()
        .find(|item| item.id == id)
        .ok_or(Error::ItemNotFound(id))
}
