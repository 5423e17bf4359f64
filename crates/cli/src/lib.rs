// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tkrs - Command-line client for a shared, live-synced to-do list.
//!
//! This crate provides the `tick` binary on top of [`tk_sync`]:
//!
//! - One-shot commands (`list`, `add`, `toggle`, `rm`, `stats`) talk to the
//!   authority directly over HTTP.
//! - `watch` runs a full sync session, rendering the optimistic replica as it
//!   changes and accepting commands on stdin.
//!
//! # Configuration
//!
//! See [`config`] for how the config file is located. All fields are
//! optional:
//!
//! ```toml
//! server = "http://127.0.0.1:8080"
//! broadcast_path = "/ws"
//! request_timeout_ms = 30000
//!
//! [reconnect]
//! delay_ms = 1000
//! backoff = "fixed"     # or "exponential"
//! max_delay_ms = 30000
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;

pub use cli::{Cli, Command, OutputFormat};
pub use error::{Error, Result};

/// Runs a parsed command line to completion.
pub fn run(cli: Cli) -> Result<()> {
    let config = config::resolve(cli.config, cli.server)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        match cli.command {
            Command::List { filter, output } => commands::list::run(&config, filter, output).await,
            Command::Add { title, output } => commands::add::run(&config, &title, output).await,
            Command::Toggle { id } => commands::lifecycle::toggle(&config, id).await,
            Command::Rm { id } => commands::lifecycle::remove(&config, id).await,
            Command::Stats { output } => commands::stats::run(&config, output).await,
            Command::Watch { filter } => commands::watch::run(&config, filter).await,
        }
    })
}
