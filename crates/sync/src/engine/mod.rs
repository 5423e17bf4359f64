// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization engine: the state machine that owns the local replica.
//!
//! ```text
//!   start ──► Loading ──ok──► Idle ◄───────────────────────┐
//!               ▲    │          │ dispatch                   │ ok
//!         retry │   err         ▼                            │
//!               │    │   Creating | Toggling | Deleting ─────┘
//!               │    ▼          │ err (rollback)
//!             Error ◄───────────┘
//!               │ dismiss
//!               └──────► Idle
//! ```
//!
//! The engine performs no I/O. Every method runs one step to completion,
//! notifies subscribers once, and hands back the [`Command`] (if any) that
//! the driver must execute. Responses come back through [`Engine::resolve`].
//!
//! Reconciliation rules:
//! - Broadcasts are applied in every phase; they upsert by id and replace stats
//! - One intent is in flight at a time; intents dispatched meanwhile are queued
//! - A broadcast touching the in-flight target supersedes the local intent:
//!   its response is discarded and its failure does not roll back
//! - A broadcast delete of the in-flight target wins over the local intent
//! - Once any broadcast lands during a flight, the reply's stats are stale
//! - A connection that goes live again after dropping triggers a full reload,
//!   deferred until no intent is in flight

mod intent;
mod replica;

pub use intent::{Command, Dispatched, Intent, IntentId, Outcome};
pub use replica::{ReplicaState, Upsert};

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use tk_core::{Broadcast, ConnectionStatus, Filter, Item, Stats};
use tracing::{debug, warn};

use crate::error::{ApiError, ApiErrorKind, EngineError};

/// Why the engine entered its error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// Engine state machine phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Fetching the full list and stats.
    Loading,
    /// Ready for the next intent.
    Idle,
    Creating,
    Toggling,
    Deleting,
    /// The last load or mutation failed; waiting for `retry` or `dismiss`.
    Error(Failure),
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Idle => "idle",
            Phase::Creating => "creating",
            Phase::Toggling => "toggling",
            Phase::Deleting => "deleting",
            Phase::Error(_) => "error",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Phase::Error(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only view handed to subscribers after each committed transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub items: Vec<Item>,
    pub stats: Stats,
    pub filter: Filter,
    pub connection: ConnectionStatus,
    /// Intents waiting for the engine to become idle.
    pub queued: usize,
}

impl Snapshot {
    /// Items visible under the snapshot's filter.
    pub fn visible(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(move |item| self.filter.matches(item))
    }
}

/// Subscriber callback. Returning `false` drops the subscription.
pub type Listener = Box<dyn FnMut(&Snapshot) -> bool + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The existing item an in-flight toggle or delete is about.
#[derive(Debug)]
struct Target {
    id: i64,
    /// A broadcast for this id arrived while the intent was in flight.
    superseded: bool,
}

impl Target {
    fn new(id: i64) -> Self {
        Target {
            id,
            superseded: false,
        }
    }
}

#[derive(Debug)]
enum InFlight {
    Load {
        ticket: IntentId,
    },
    Create {
        ticket: IntentId,
        temp_id: i64,
        title: String,
        /// Authority id of a Created broadcast that replaced the placeholder.
        adopted: Option<i64>,
    },
    Toggle {
        ticket: IntentId,
        target: Target,
        previous: bool,
    },
    Delete {
        ticket: IntentId,
        target: Target,
        /// Original position and contents, for rollback.
        stash: Option<(usize, Item)>,
    },
}

impl InFlight {
    fn ticket(&self) -> IntentId {
        match self {
            InFlight::Load { ticket }
            | InFlight::Create { ticket, .. }
            | InFlight::Toggle { ticket, .. }
            | InFlight::Delete { ticket, .. } => *ticket,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            InFlight::Load { .. } => "load",
            InFlight::Create { .. } => "create",
            InFlight::Toggle { .. } => "toggle",
            InFlight::Delete { .. } => "delete",
        }
    }
}

/// The synchronization engine.
pub struct Engine {
    replica: ReplicaState,
    phase: Phase,
    in_flight: Option<InFlight>,
    queue: VecDeque<(IntentId, Intent)>,
    /// Ids deleted by broadcast while the current intent was in flight.
    tombstones: HashSet<i64>,
    /// A broadcast was applied while the current command was in flight.
    broadcast_seen: bool,
    /// The broadcast connection has been live at least once.
    was_live: bool,
    /// Broadcasts may have been missed; reload once idle.
    resync: bool,
    next_ticket: u64,
    next_temp_id: i64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with an empty replica, waiting for [`Engine::start`].
    pub fn new() -> Self {
        Engine {
            replica: ReplicaState::new(),
            phase: Phase::Loading,
            in_flight: None,
            queue: VecDeque::new(),
            tombstones: HashSet::new(),
            broadcast_seen: false,
            was_live: false,
            resync: false,
            next_ticket: 1,
            next_temp_id: -1,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn replica(&self) -> &ReplicaState {
        &self.replica
    }

    /// Number of intents waiting for the engine to become idle.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Ticket of the command currently awaiting a response.
    pub fn in_flight(&self) -> Option<IntentId> {
        self.in_flight.as_ref().map(InFlight::ticket)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase.clone(),
            items: self.replica.items().to_vec(),
            stats: self.replica.stats(),
            filter: self.replica.filter(),
            connection: self.replica.connection(),
            queued: self.queue.len(),
        }
    }

    /// Issues the initial full load.
    ///
    /// Returns `None` if a load is already in flight or the engine has
    /// already loaded; use [`Engine::retry`] to reload after an error.
    pub fn start(&mut self) -> Option<Command> {
        if self.in_flight.is_some() || self.phase != Phase::Loading {
            return None;
        }
        let command = self.begin_load();
        self.commit();
        Some(command)
    }

    /// Leaves the error state by re-issuing the full load.
    pub fn retry(&mut self) -> Option<Command> {
        if !matches!(self.phase, Phase::Error(_)) {
            return None;
        }
        let command = self.begin_load();
        self.commit();
        Some(command)
    }

    /// Leaves the error state without reloading, then drains the queue.
    pub fn dismiss(&mut self) -> Option<Command> {
        if !matches!(self.phase, Phase::Error(_)) {
            return None;
        }
        self.phase = Phase::Idle;
        let next = self.drain();
        self.commit();
        next
    }

    /// Accepts a user intent.
    ///
    /// From `Idle` the intent is applied optimistically and its command is
    /// returned for execution. While loading or while another intent is in
    /// flight it is queued and sent once the engine is idle again. In the
    /// error state it is rejected.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Dispatched, EngineError> {
        if matches!(self.phase, Phase::Error(_)) {
            return Err(EngineError::Blocked {
                phase: self.phase.to_string(),
            });
        }
        let intent = self.validate(intent)?;
        let ticket = self.next_ticket();

        if self.phase.is_idle() {
            let kind = intent.kind();
            let Some(command) = self.send(ticket, intent) else {
                return Err(EngineError::Validation(format!("{kind} target no longer exists")));
            };
            self.commit();
            return Ok(Dispatched::Sent(command));
        }

        debug!("queueing {} {} while {}", intent.kind(), ticket, self.phase);
        self.queue.push_back((ticket, intent));
        let position = self.queue.len();
        self.commit();
        Ok(Dispatched::Queued { ticket, position })
    }

    /// Feeds back the response to a command.
    ///
    /// Responses for anything other than the in-flight ticket are ignored.
    pub fn resolve(&mut self, ticket: IntentId, result: Result<Outcome, ApiError>) -> Option<Command> {
        if self.in_flight() != Some(ticket) {
            debug!("ignoring response for {} (not in flight)", ticket);
            return None;
        }
        let flight = self.in_flight.take()?;

        let next = match result {
            Ok(outcome) => self.settle(flight, outcome),
            Err(error) => {
                self.fail(flight, error);
                None
            }
        };
        self.tombstones.clear();
        self.commit();
        next
    }

    /// Merges an authority-pushed change. Valid in every phase.
    pub fn apply_broadcast(&mut self, broadcast: Broadcast) {
        debug!("applying broadcast for item {}", broadcast.target());
        if self.in_flight.is_some() {
            self.broadcast_seen = true;
        }
        let stats = broadcast.stats();
        match broadcast {
            Broadcast::Created { item, .. } => self.merge_item(item, true),
            Broadcast::Updated { item, .. } => self.merge_item(item, false),
            Broadcast::Deleted { id, .. } => self.merge_delete(id),
        }
        self.replica.set_stats(stats);
        self.commit();
    }

    /// Changes the visible projection. No network effect.
    pub fn set_filter(&mut self, filter: Filter) {
        if self.replica.set_filter(filter) {
            self.commit();
        }
    }

    /// Records the broadcast connection state.
    ///
    /// Going live again after the connection dropped means broadcasts may
    /// have been missed, so a reload is scheduled. It is returned right away
    /// when idle, otherwise issued once the engine next becomes idle.
    pub fn set_connection(&mut self, connection: ConnectionStatus) -> Option<Command> {
        if !self.replica.set_connection(connection) {
            return None;
        }
        if connection == ConnectionStatus::Live {
            if self.was_live {
                debug!("connection restored, scheduling reload");
                self.resync = true;
            }
            self.was_live = true;
        }
        let next = if self.phase.is_idle() { self.drain() } else { None };
        self.commit();
        next
    }

    /// Registers a listener and immediately hands it the current snapshot.
    pub fn subscribe(&mut self, mut listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        if listener(&self.snapshot()) {
            self.listeners.push((id, listener));
        }
        id
    }

    /// Drops a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn commit(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        self.listeners.retain_mut(|(_, listener)| listener(&snapshot));
    }

    fn next_ticket(&mut self) -> IntentId {
        let ticket = IntentId(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    fn begin_load(&mut self) -> Command {
        let ticket = self.next_ticket();
        self.phase = Phase::Loading;
        self.in_flight = Some(InFlight::Load { ticket });
        self.broadcast_seen = false;
        self.resync = false;
        Command::Load { ticket }
    }

    fn validate(&self, intent: Intent) -> Result<Intent, EngineError> {
        if let Intent::Create { title } = &intent {
            let title = title.trim();
            if title.is_empty() {
                return Err(EngineError::Validation("title must not be empty".into()));
            }
            return Ok(Intent::create(title));
        }
        if let Some(id) = intent.target() {
            match self.replica.get(id) {
                None => {
                    return Err(EngineError::Validation(format!("item {id} does not exist")));
                }
                Some(item) if item.is_placeholder() => {
                    return Err(EngineError::Validation(format!(
                        "item {id} is not confirmed yet"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(intent)
    }

    /// Applies the intent optimistically and moves into its working phase.
    fn send(&mut self, ticket: IntentId, intent: Intent) -> Option<Command> {
        let (phase, flight, command) = match intent {
            Intent::Create { title } => {
                let temp_id = self.next_temp_id;
                self.next_temp_id -= 1;
                self.replica
                    .insert_at(0, Item::placeholder(temp_id, title.clone(), unix_now()));
                (
                    Phase::Creating,
                    InFlight::Create {
                        ticket,
                        temp_id,
                        title: title.clone(),
                        adopted: None,
                    },
                    Command::Create { ticket, title },
                )
            }
            Intent::Toggle { id } => {
                let completed = !self.replica.get(id)?.completed;
                let previous = self.replica.set_completed(id, completed)?;
                (
                    Phase::Toggling,
                    InFlight::Toggle {
                        ticket,
                        target: Target::new(id),
                        previous,
                    },
                    Command::Toggle {
                        ticket,
                        id,
                        completed,
                    },
                )
            }
            Intent::Delete { id } => {
                let stash = self.replica.remove(id)?;
                (
                    Phase::Deleting,
                    InFlight::Delete {
                        ticket,
                        target: Target::new(id),
                        stash: Some(stash),
                    },
                    Command::Delete { ticket, id },
                )
            }
        };

        debug!("sending {} {}", flight.kind(), ticket);
        self.phase = phase;
        self.in_flight = Some(flight);
        self.tombstones.clear();
        self.broadcast_seen = false;
        Some(command)
    }

    /// Issues a pending reload, or sends the next queued intent whose
    /// target still exists.
    fn drain(&mut self) -> Option<Command> {
        if self.resync && self.phase.is_idle() {
            return Some(self.begin_load());
        }
        while self.phase.is_idle() {
            let (ticket, intent) = self.queue.pop_front()?;
            let kind = intent.kind();
            match self.validate(intent) {
                Ok(intent) => {
                    if let Some(command) = self.send(ticket, intent) {
                        return Some(command);
                    }
                    warn!("skipping queued {} {}: target vanished", kind, ticket);
                }
                Err(e) => warn!("skipping queued {} {}: {}", kind, ticket, e),
            }
        }
        None
    }

    fn settle(&mut self, flight: InFlight, outcome: Outcome) -> Option<Command> {
        match (flight, outcome) {
            (InFlight::Load { .. }, Outcome::Loaded { items, stats }) => {
                debug!("loaded {} items", items.len());
                self.replica.reset(items, stats);
            }
            (InFlight::Create { temp_id, .. }, Outcome::Created(reply)) => {
                if self.tombstones.contains(&reply.value.id) {
                    debug!("created item {} was deleted before confirmation", reply.value.id);
                    self.replica.remove(temp_id);
                } else {
                    self.replica.confirm_placeholder(temp_id, reply.value);
                    self.apply_stats(reply.stats);
                }
            }
            (InFlight::Toggle { target, .. }, Outcome::Toggled(reply)) => {
                if target.superseded || self.tombstones.contains(&target.id) {
                    debug!("discarding toggle response for item {}", target.id);
                } else {
                    self.replica.upsert(reply.value);
                    self.apply_stats(reply.stats);
                }
            }
            (InFlight::Delete { target, .. }, Outcome::Deleted(reply)) if reply.value => {
                self.replica.remove(target.id);
                self.apply_stats(reply.stats);
            }
            (flight @ InFlight::Delete { .. }, Outcome::Deleted(_)) => {
                self.fail(flight, ApiError::server("delete was not acknowledged"));
                return None;
            }
            (flight, outcome) => {
                warn!("{} {} got mismatched response: {:?}", flight.kind(), flight.ticket(), outcome);
                self.fail(flight, ApiError::protocol("response does not match the request"));
                return None;
            }
        }
        self.phase = Phase::Idle;
        self.drain()
    }

    /// Rolls back the optimistic change and enters the error state.
    fn fail(&mut self, flight: InFlight, error: ApiError) {
        warn!(
            kind = %error.kind,
            "{} {} failed: {}",
            flight.kind(),
            flight.ticket(),
            error.message
        );
        match flight {
            InFlight::Load { .. } => {}
            InFlight::Create { temp_id, .. } => {
                self.replica.remove(temp_id);
            }
            InFlight::Toggle {
                target, previous, ..
            } => {
                if !target.superseded && !self.tombstones.contains(&target.id) {
                    self.replica.set_completed(target.id, previous);
                }
            }
            InFlight::Delete { stash, .. } => {
                if let Some((index, item)) = stash {
                    self.replica.insert_at(index, item);
                }
            }
        }
        self.phase = Phase::Error(error.into());
    }

    /// Applies reply stats unless a broadcast already carried newer ones.
    fn apply_stats(&mut self, stats: Option<Stats>) {
        if self.broadcast_seen {
            debug!("ignoring reply stats, a broadcast landed during the flight");
            return;
        }
        if let Some(stats) = stats {
            self.replica.set_stats(stats);
        }
    }

    fn merge_item(&mut self, item: Item, created: bool) {
        match self.in_flight.as_mut() {
            Some(InFlight::Delete {
                target,
                stash: Some((_, stashed)),
                ..
            }) if target.id == item.id => {
                // Keep it hidden; a failed delete restores the newer copy.
                target.superseded = true;
                *stashed = item;
                return;
            }
            Some(InFlight::Toggle { target, .. }) if target.id == item.id => {
                target.superseded = true;
            }
            Some(InFlight::Create {
                temp_id,
                title,
                adopted,
                ..
            }) if created
                && adopted.is_none()
                && *title == item.title
                && !self.replica.contains(item.id) =>
            {
                debug!("item {} adopts placeholder {}", item.id, temp_id);
                *adopted = Some(item.id);
                self.replica.confirm_placeholder(*temp_id, item);
                return;
            }
            _ => {}
        }
        self.replica.upsert(item);
    }

    fn merge_delete(&mut self, id: i64) {
        if let Some(flight) = self.in_flight.as_mut() {
            self.tombstones.insert(id);
            if let InFlight::Delete { target, stash, .. } = flight {
                if target.id == id {
                    *stash = None;
                }
            }
        }
        self.replica.remove(id);
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
