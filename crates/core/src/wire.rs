// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Protobuf messages exchanged with the authority.
//!
//! These are hand-bound `prost` messages mirroring `todo.proto`. Field
//! numbers are part of the wire contract and must never be reused; new
//! fields get new numbers so older consumers keep decoding.

use prost::Message;

/// A single todo as stored by the authority.
#[derive(Clone, PartialEq, Message)]
pub struct Todo {
    #[prost(int64, tag = "1")]
    pub id: i64,

    #[prost(string, tag = "2")]
    pub title: String,

    #[prost(bool, tag = "3")]
    pub completed: bool,

    /// Unix seconds.
    #[prost(int64, tag = "4")]
    pub created_at: i64,
}

/// Body of `GET /api/todos`, newest first.
#[derive(Clone, PartialEq, Message)]
pub struct TodoList {
    #[prost(message, repeated, tag = "1")]
    pub todos: Vec<Todo>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TodoStats {
    #[prost(uint32, tag = "1")]
    pub total: u32,

    #[prost(uint32, tag = "2")]
    pub completed: u32,

    #[prost(uint32, tag = "3")]
    pub active: u32,
}

/// Body of `POST /api/todos`.
#[derive(Clone, PartialEq, Message)]
pub struct CreateTodoRequest {
    #[prost(string, tag = "1")]
    pub title: String,
}

/// Body of `PUT /api/todos/{id}/toggle`.
#[derive(Clone, PartialEq, Message)]
pub struct UpdateTodoRequest {
    #[prost(bool, tag = "1")]
    pub completed: bool,
}

/// Envelope returned by every mutating endpoint and by `GET /api/stats`.
#[derive(Clone, PartialEq, Message)]
pub struct ApiResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,

    #[prost(string, tag = "2")]
    pub message: String,

    #[prost(message, optional, tag = "3")]
    pub todo: Option<Todo>,

    #[prost(message, optional, tag = "4")]
    pub stats: Option<TodoStats>,
}

/// A change pushed by the authority over the broadcast connection.
#[derive(Clone, PartialEq, Message)]
pub struct TodoEvent {
    /// Maps to the [`EventType`] enum.
    #[prost(enumeration = "EventType", tag = "1")]
    pub kind: i32,

    /// Present for CREATED and UPDATED.
    #[prost(message, optional, tag = "2")]
    pub todo: Option<Todo>,

    /// Present for DELETED.
    #[prost(int64, optional, tag = "3")]
    pub deleted_id: Option<i64>,

    /// Always present: stats after the change was applied.
    #[prost(message, optional, tag = "4")]
    pub stats: Option<TodoStats>,
}

/// Kind of change carried by a [`TodoEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum EventType {
    Created = 0,
    Updated = 1,
    Deleted = 2,
}
