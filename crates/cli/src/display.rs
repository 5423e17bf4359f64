// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Local, Utc};
use tk_core::{Item, Stats};
use tk_sync::{Phase, Snapshot};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Formats an epoch-seconds timestamp in local time.
pub fn format_timestamp(secs: i64) -> String {
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(utc) => utc.with_timezone(&Local).format(DATE_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Formats an item as a single line.
///
/// Format: `[x] #7  Buy milk  (2026-10-17 09:30)`; unconfirmed items show
/// `#new` instead of an id.
pub fn format_item_line(item: &Item) -> String {
    let mark = if item.completed { 'x' } else { ' ' };
    let id = if item.is_placeholder() {
        "#new".to_string()
    } else {
        format!("#{}", item.id)
    };
    format!(
        "[{}] {}  {}  ({})",
        mark,
        id,
        item.title,
        format_timestamp(item.created_at)
    )
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "{} total, {} active, {} completed",
        stats.total, stats.active, stats.completed
    )
}

/// Renders a full snapshot for `watch`.
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut header = format!(
        "[{} | {} | filter: {}",
        snapshot.phase, snapshot.connection, snapshot.filter
    );
    if snapshot.queued > 0 {
        header.push_str(&format!(" | {} queued", snapshot.queued));
    }
    header.push(']');

    let mut lines = vec![header];
    let before = lines.len();
    lines.extend(snapshot.visible().map(format_item_line));
    if lines.len() == before {
        lines.push("  (no items)".to_string());
    }
    lines.push(format_stats(&snapshot.stats));

    if let Phase::Error(failure) = &snapshot.phase {
        lines.push(format!(
            "error: {} error: {}\n  hint: type 'retry' to reload or 'dismiss' to continue",
            failure.kind, failure.message
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
