// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live view: renders every snapshot and reads commands from stdin.

use std::io::Write;

use tk_core::Filter;
use tk_sync::{Dispatched, Intent, SessionHandle, SyncClient, SyncConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::display::render_snapshot;
use crate::error::{Error, Result};

/// One line typed while watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Add(String),
    Toggle(i64),
    Rm(i64),
    Filter(Filter),
    Retry,
    Dismiss,
    Quit,
}

/// Parses a line of input. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<WatchCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "add" => {
            if rest.is_empty() {
                return Err(Error::InvalidArgument("usage: add <title>".into()));
            }
            WatchCommand::Add(rest.to_string())
        }
        "toggle" => WatchCommand::Toggle(parse_id(rest)?),
        "rm" => WatchCommand::Rm(parse_id(rest)?),
        "filter" => WatchCommand::Filter(rest.parse()?),
        "retry" => WatchCommand::Retry,
        "dismiss" => WatchCommand::Dismiss,
        "quit" | "exit" => WatchCommand::Quit,
        other => return Err(Error::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_id(value: &str) -> Result<i64> {
    value
        .trim_start_matches('#')
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("invalid id: '{value}'")))
}

/// Forwards a command to the session. Returns a note for the user, if any.
pub(crate) async fn apply(handle: &SessionHandle, command: WatchCommand) -> Result<Option<String>> {
    let intent = match command {
        WatchCommand::Add(title) => Intent::create(title),
        WatchCommand::Toggle(id) => Intent::toggle(id),
        WatchCommand::Rm(id) => Intent::delete(id),
        WatchCommand::Filter(filter) => {
            handle.set_filter(filter)?;
            return Ok(None);
        }
        WatchCommand::Retry => {
            handle.retry()?;
            return Ok(None);
        }
        WatchCommand::Dismiss => {
            handle.dismiss()?;
            return Ok(None);
        }
        WatchCommand::Quit => return Ok(None),
    };

    match handle.dispatch(intent).await? {
        Dispatched::Sent(command) => {
            debug!(ticket = %command.ticket(), "intent sent");
            Ok(None)
        }
        Dispatched::Queued { position, .. } => Ok(Some(format!("queued (position {position})"))),
    }
}

pub async fn run(config: &SyncConfig, filter: Filter) -> Result<()> {
    let client = SyncClient::start(config)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let result = watch_loop(&client.handle(), filter, stdin, &mut std::io::stdout()).await;
    client.shutdown().await;
    result
}

/// Renders snapshots and applies commands until quit, EOF or Ctrl-C.
///
/// Pending snapshots are always rendered before the next line is read.
pub(crate) async fn watch_loop<R>(
    handle: &SessionHandle,
    filter: Filter,
    input: R,
    out: &mut impl Write,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    handle.set_filter(filter)?;
    let mut snapshots = handle.subscribe()?;
    let mut lines = input.lines();

    loop {
        tokio::select! {
            biased;
            snapshot = snapshots.next() => match snapshot {
                Some(snapshot) => {
                    writeln!(out, "{}\n", render_snapshot(&snapshot))?;
                    out.flush()?;
                }
                None => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(Some(command)) => match apply(handle, command).await {
                        Ok(Some(note)) => writeln!(out, "{note}")?,
                        Ok(None) => {}
                        Err(e) => eprintln!("error: {e}"),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("error: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
