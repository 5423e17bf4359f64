// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Intents going into the engine and commands coming out of it.

use std::fmt;

use tk_core::{Item, Reply, Stats};

/// Correlation token tying a command to its eventual response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentId(pub u64);

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A user-originated request, not yet confirmed by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Add a new item with the given title.
    Create { title: String },
    /// Flip the completion flag of an item.
    ///
    /// The target value is read from the replica when the intent is sent,
    /// so two queued toggles cancel out.
    Toggle { id: i64 },
    /// Remove an item.
    Delete { id: i64 },
}

impl Intent {
    pub fn create(title: impl Into<String>) -> Self {
        Intent::Create {
            title: title.into(),
        }
    }

    pub fn toggle(id: i64) -> Self {
        Intent::Toggle { id }
    }

    pub fn delete(id: i64) -> Self {
        Intent::Delete { id }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Intent::Create { .. } => "create",
            Intent::Toggle { .. } => "toggle",
            Intent::Delete { .. } => "delete",
        }
    }

    /// The existing item this intent targets, if any.
    pub fn target(&self) -> Option<i64> {
        match self {
            Intent::Create { .. } => None,
            Intent::Toggle { id } | Intent::Delete { id } => Some(*id),
        }
    }
}

/// A remote operation the driver must perform on the engine's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the full list and stats.
    Load { ticket: IntentId },
    Create { ticket: IntentId, title: String },
    Toggle {
        ticket: IntentId,
        id: i64,
        completed: bool,
    },
    Delete { ticket: IntentId, id: i64 },
}

impl Command {
    pub fn ticket(&self) -> IntentId {
        match self {
            Command::Load { ticket }
            | Command::Create { ticket, .. }
            | Command::Toggle { ticket, .. }
            | Command::Delete { ticket, .. } => *ticket,
        }
    }
}

/// A successful response to a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded { items: Vec<Item>, stats: Stats },
    Created(Reply<Item>),
    Toggled(Reply<Item>),
    Deleted(Reply<bool>),
}

/// What `dispatch` did with an accepted intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Applied optimistically; the command must be executed now.
    Sent(Command),
    /// Held until the engine is idle again. `position` is 1-based.
    Queued { ticket: IntentId, position: usize },
}

impl Dispatched {
    pub fn ticket(&self) -> IntentId {
        match self {
            Dispatched::Sent(command) => command.ticket(),
            Dispatched::Queued { ticket, .. } => *ticket,
        }
    }
}
