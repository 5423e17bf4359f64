// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tk_sync::{RemoteApi, SyncConfig};

use crate::error::Result;

use super::{find_item, open_api};

pub async fn toggle(config: &SyncConfig, id: i64) -> Result<()> {
    let api = open_api(config)?;
    toggle_impl(&api, id, &mut std::io::stdout()).await
}

/// Flips `id` to the opposite of its current completion flag.
pub(crate) async fn toggle_impl(api: &dyn RemoteApi, id: i64, out: &mut impl Write) -> Result<()> {
    let current = find_item(api, id).await?;
    let reply = api.toggle(id, !current.completed).await?;
    let item = reply.value;

    let verb = if item.completed { "Completed" } else { "Reopened" };
    writeln!(out, "{} #{}: {}", verb, item.id, item.title)?;
    Ok(())
}

pub async fn remove(config: &SyncConfig, id: i64) -> Result<()> {
    let api = open_api(config)?;
    remove_impl(&api, id, &mut std::io::stdout()).await
}

/// Deletes `id`; the item must exist so a typo is reported.
pub(crate) async fn remove_impl(api: &dyn RemoteApi, id: i64, out: &mut impl Write) -> Result<()> {
    let item = find_item(api, id).await?;
    api.delete(id).await?;
    writeln!(out, "Deleted #{}: {}", item.id, item.title)?;
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
