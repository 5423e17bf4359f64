// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core replica types for the tick list client.
//!
//! This module contains the fundamental data types: Item, Stats, Filter,
//! and ConnectionStatus.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single list entry as known to the authority.
///
/// Authority-assigned ids are positive. The replica uses negative ids for
/// placeholders created by an optimistic `create` that is still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    /// Unix seconds, assigned by the authority.
    pub created_at: i64,
}

impl Item {
    /// Creates an item with the given fields.
    pub fn new(id: i64, title: impl Into<String>, completed: bool, created_at: i64) -> Self {
        Item {
            id,
            title: title.into(),
            completed,
            created_at,
        }
    }

    /// Creates a placeholder for an unconfirmed create. `temp_id` must be negative.
    pub fn placeholder(temp_id: i64, title: impl Into<String>, created_at: i64) -> Self {
        Item::new(temp_id, title, false, created_at)
    }

    /// Returns true if this item has not been confirmed by the authority.
    pub fn is_placeholder(&self) -> bool {
        self.id < 0
    }
}

/// Aggregate counts computed by the authority.
///
/// Stats are never recomputed locally; the replica replaces them wholesale
/// whenever the authority sends fresh ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u32,
    pub active: u32,
    pub completed: u32,
}

impl Stats {
    /// Creates stats from total and completed counts.
    pub fn new(total: u32, completed: u32) -> Self {
        Stats {
            total,
            active: total.saturating_sub(completed),
            completed,
        }
    }

    /// Returns true if `total == active + completed`.
    pub fn is_consistent(&self) -> bool {
        self.active.checked_add(self.completed) == Some(self.total)
    }
}

/// Which items the renderer should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Returns the string representation used in config and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Returns true if the item is visible under this filter.
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !item.completed,
            Filter::Completed => item.completed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            _ => Err(Error::InvalidFilter(s.to_string())),
        }
    }
}

/// State of the broadcast connection as seen by the replica.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// First connection attempt (or attempt after a reconnect delay).
    #[default]
    Connecting,
    /// Connected and receiving broadcasts.
    Live,
    /// Waiting out the delay before the next attempt.
    Reconnecting,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Live => "live",
            ConnectionStatus::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod tests;
