// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tk_sync::{RemoteApi, SyncConfig};

use crate::cli::OutputFormat;
use crate::display::format_stats;
use crate::error::Result;

use super::open_api;

pub async fn run(config: &SyncConfig, output: OutputFormat) -> Result<()> {
    let api = open_api(config)?;
    run_impl(&api, output, &mut std::io::stdout()).await
}

pub(crate) async fn run_impl(api: &dyn RemoteApi, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let stats = api.stats().await?;
    match output {
        OutputFormat::Text => writeln!(out, "{}", format_stats(&stats))?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
