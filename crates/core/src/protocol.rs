// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Domain view of the authority protocol.
//!
//! The protocol is simple:
//! - The client sends create/toggle/delete requests and list/stats queries
//! - The authority answers each with an [`Envelope`] or a [`wire::TodoList`]
//! - The authority pushes a [`Broadcast`] to every client after each change
//!
//! Decoding is strict: anything that does not fit the schema is rejected
//! here so that nothing downstream ever sees a half-formed item.

use prost::Message;

use crate::error::{Error, Result};
use crate::model::{Item, Stats};
use crate::wire::{self, EventType};

impl TryFrom<wire::Todo> for Item {
    type Error = Error;

    fn try_from(todo: wire::Todo) -> Result<Self> {
        if todo.id <= 0 {
            return Err(Error::schema(format!("todo id must be positive, got {}", todo.id)));
        }
        if todo.title.is_empty() {
            return Err(Error::schema(format!("todo {} has an empty title", todo.id)));
        }
        Ok(Item::new(todo.id, todo.title, todo.completed, todo.created_at))
    }
}

impl From<&Item> for wire::Todo {
    fn from(item: &Item) -> Self {
        wire::Todo {
            id: item.id,
            title: item.title.clone(),
            completed: item.completed,
            created_at: item.created_at,
        }
    }
}

impl TryFrom<wire::TodoStats> for Stats {
    type Error = Error;

    fn try_from(stats: wire::TodoStats) -> Result<Self> {
        let stats = Stats {
            total: stats.total,
            active: stats.active,
            completed: stats.completed,
        };
        if !stats.is_consistent() {
            return Err(Error::schema(format!(
                "stats do not add up: total={} active={} completed={}",
                stats.total, stats.active, stats.completed
            )));
        }
        Ok(stats)
    }
}

impl From<Stats> for wire::TodoStats {
    fn from(stats: Stats) -> Self {
        wire::TodoStats {
            total: stats.total,
            completed: stats.completed,
            active: stats.active,
        }
    }
}

/// An authority-pushed change.
///
/// Every broadcast is sourced from post-mutation authoritative state, so it
/// always carries the stats as they stood right after the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    Created { item: Item, stats: Stats },
    Updated { item: Item, stats: Stats },
    Deleted { id: i64, stats: Stats },
}

impl Broadcast {
    /// Creates a Created broadcast.
    pub fn created(item: Item, stats: Stats) -> Self {
        Broadcast::Created { item, stats }
    }

    /// Creates an Updated broadcast.
    pub fn updated(item: Item, stats: Stats) -> Self {
        Broadcast::Updated { item, stats }
    }

    /// Creates a Deleted broadcast.
    pub fn deleted(id: i64, stats: Stats) -> Self {
        Broadcast::Deleted { id, stats }
    }

    /// The id of the item this broadcast is about.
    pub fn target(&self) -> i64 {
        match self {
            Broadcast::Created { item, .. } | Broadcast::Updated { item, .. } => item.id,
            Broadcast::Deleted { id, .. } => *id,
        }
    }

    /// Stats after the change.
    pub fn stats(&self) -> Stats {
        match self {
            Broadcast::Created { stats, .. }
            | Broadcast::Updated { stats, .. }
            | Broadcast::Deleted { stats, .. } => *stats,
        }
    }

    /// Converts a decoded wire event, validating the per-type fields.
    pub fn from_wire(event: wire::TodoEvent) -> Result<Self> {
        let kind = EventType::try_from(event.kind)
            .map_err(|_| Error::schema(format!("unknown event type {}", event.kind)))?;
        let stats = event
            .stats
            .ok_or_else(|| Error::schema("event is missing stats"))
            .and_then(Stats::try_from)?;

        match kind {
            EventType::Created | EventType::Updated => {
                let todo = event
                    .todo
                    .ok_or_else(|| Error::schema(format!("{kind:?} event is missing its todo")))?;
                let item = Item::try_from(todo)?;
                Ok(match kind {
                    EventType::Created => Broadcast::created(item, stats),
                    _ => Broadcast::updated(item, stats),
                })
            }
            EventType::Deleted => {
                let id = event
                    .deleted_id
                    .ok_or_else(|| Error::schema("Deleted event is missing deleted_id"))?;
                Ok(Broadcast::deleted(id, stats))
            }
        }
    }

    /// Converts to the wire representation.
    pub fn to_wire(&self) -> wire::TodoEvent {
        let (kind, todo, deleted_id): (EventType, Option<wire::Todo>, Option<i64>) = match self {
            Broadcast::Created { item, .. } => (EventType::Created, Some(item.into()), None),
            Broadcast::Updated { item, .. } => (EventType::Updated, Some(item.into()), None),
            Broadcast::Deleted { id, .. } => (EventType::Deleted, None, Some(*id)),
        };
        wire::TodoEvent {
            kind: kind as i32,
            todo,
            deleted_id,
            stats: Some(self.stats().into()),
        }
    }

    /// Decodes a broadcast frame.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::from_wire(wire::TodoEvent::decode(bytes)?)
    }

    /// Encodes to a broadcast frame.
    pub fn encode(&self) -> Vec<u8> {
        self.to_wire().encode_to_vec()
    }
}

/// Decoded [`wire::ApiResponse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// `success = true`.
    Accepted {
        message: String,
        item: Option<Item>,
        stats: Option<Stats>,
    },
    /// `success = false`; the authority refused the request.
    Rejected { message: String },
}

impl Envelope {
    /// Decodes an `ApiResponse` body.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let response = wire::ApiResponse::decode(bytes)?;
        if !response.success {
            let message = if response.message.is_empty() {
                "request failed".to_string()
            } else {
                response.message
            };
            return Ok(Envelope::Rejected { message });
        }

        Ok(Envelope::Accepted {
            message: response.message,
            item: response.todo.map(Item::try_from).transpose()?,
            stats: response.stats.map(Stats::try_from).transpose()?,
        })
    }
}

/// The value a mutation produced, plus stats if the authority sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
    pub value: T,
    pub stats: Option<Stats>,
}

impl<T> Reply<T> {
    pub fn new(value: T, stats: Option<Stats>) -> Self {
        Reply { value, stats }
    }
}

/// Decodes a `TodoList` body into items, newest first as sent.
pub fn decode_items(bytes: &[u8]) -> Result<Vec<Item>> {
    wire::TodoList::decode(bytes)?
        .todos
        .into_iter()
        .map(Item::try_from)
        .collect()
}

/// Encodes the body of a create request.
pub fn create_request(title: &str) -> Vec<u8> {
    wire::CreateTodoRequest {
        title: title.to_string(),
    }
    .encode_to_vec()
}

/// Encodes the body of a toggle request.
pub fn update_request(completed: bool) -> Vec<u8> {
    wire::UpdateTodoRequest { completed }.encode_to_vec()
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
