// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use serde::Serialize;
use tk_core::{Filter, Item, Stats};
use tk_sync::{RemoteApi, SyncConfig};

use crate::cli::OutputFormat;
use crate::display::{format_item_line, format_stats};
use crate::error::Result;

use super::open_api;

/// JSON output structure for the list command.
#[derive(Serialize)]
struct ListOutput<'a> {
    filter: Filter,
    items: Vec<&'a Item>,
    stats: Stats,
}

pub async fn run(config: &SyncConfig, filter: Filter, output: OutputFormat) -> Result<()> {
    let api = open_api(config)?;
    run_impl(&api, filter, output, &mut std::io::stdout()).await
}

/// Internal implementation that accepts an API for testing.
pub(crate) async fn run_impl(
    api: &dyn RemoteApi,
    filter: Filter,
    output: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let (items, stats) = api.list().await?;
    let visible: Vec<&Item> = items.iter().filter(|item| filter.matches(item)).collect();

    match output {
        OutputFormat::Text => {
            if visible.is_empty() {
                writeln!(out, "No items")?;
            }
            for item in &visible {
                writeln!(out, "{}", format_item_line(item))?;
            }
            writeln!(out, "{}", format_stats(&stats))?;
        }
        OutputFormat::Json => {
            let body = ListOutput {
                filter,
                items: visible,
                stats,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
