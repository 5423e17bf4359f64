// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use serde::Serialize;
use tk_core::{Item, Stats};
use tk_sync::{RemoteApi, SyncConfig};

use crate::cli::OutputFormat;
use crate::error::{Error, Result};

use super::open_api;

#[derive(Serialize)]
struct AddOutput {
    item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
}

pub async fn run(config: &SyncConfig, title: &str, output: OutputFormat) -> Result<()> {
    let api = open_api(config)?;
    run_impl(&api, title, output, &mut std::io::stdout()).await
}

pub(crate) async fn run_impl(
    api: &dyn RemoteApi,
    title: &str,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidArgument("title must not be empty".into()));
    }

    let reply = api.create(title).await?;
    match output {
        OutputFormat::Text => writeln!(out, "Added #{}: {}", reply.value.id, reply.value.title)?,
        OutputFormat::Json => {
            let body = AddOutput {
                item: reply.value,
                stats: reply.stats,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
