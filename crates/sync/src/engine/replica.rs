// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local replica of authority state.
//!
//! Reconciliation rules:
//! - Items are keyed by id; every write is an upsert, never a blind append
//! - New items go to the front (the authority orders newest first)
//! - Stats are replaced wholesale and never recomputed from `items`

use tk_core::{ConnectionStatus, Filter, Item, Stats};

/// Whether an upsert added a new entry or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// The single mutable aggregate owned by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicaState {
    items: Vec<Item>,
    stats: Stats,
    filter: Filter,
    connection: ConnectionStatus,
}

impl ReplicaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Items visible under the current filter, in replica order.
    pub fn visible(&self) -> impl Iterator<Item = &Item> + '_ {
        self.items.iter().filter(move |item| self.filter.matches(item))
    }

    /// Inserts the item at the front, or overwrites the entry with its id.
    pub fn upsert(&mut self, item: Item) -> Upsert {
        match self.position(item.id) {
            Some(index) => {
                self.items[index] = item;
                Upsert::Updated
            }
            None => {
                self.items.insert(0, item);
                Upsert::Inserted
            }
        }
    }

    /// Inserts at `index` (clamped), or overwrites in place if the id exists.
    pub fn insert_at(&mut self, index: usize, item: Item) {
        match self.position(item.id) {
            Some(existing) => self.items[existing] = item,
            None => {
                let index = index.min(self.items.len());
                self.items.insert(index, item);
            }
        }
    }

    /// Swaps a placeholder for its authoritative item.
    ///
    /// If the authoritative id is already present (its broadcast arrived
    /// first), that entry is updated and the placeholder is dropped, so the
    /// item never appears twice. Otherwise the placeholder is replaced in
    /// place, or the item is upserted if the placeholder is already gone.
    pub fn confirm_placeholder(&mut self, temp_id: i64, item: Item) {
        if self.contains(item.id) {
            self.remove(temp_id);
            self.upsert(item);
            return;
        }
        match self.position(temp_id) {
            Some(index) => self.items[index] = item,
            None => {
                self.upsert(item);
            }
        }
    }

    /// Removes the item, returning where it was and what it held.
    pub fn remove(&mut self, id: i64) -> Option<(usize, Item)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Sets the completion flag, returning the previous value.
    pub fn set_completed(&mut self, id: i64, completed: bool) -> Option<bool> {
        let index = self.position(id)?;
        let previous = self.items[index].completed;
        self.items[index].completed = completed;
        Some(previous)
    }

    pub fn set_stats(&mut self, stats: Stats) {
        self.stats = stats;
    }

    pub fn set_filter(&mut self, filter: Filter) -> bool {
        let changed = self.filter != filter;
        self.filter = filter;
        changed
    }

    pub fn set_connection(&mut self, connection: ConnectionStatus) -> bool {
        let changed = self.connection != connection;
        self.connection = connection;
        changed
    }

    /// Replaces all items and stats with a full authority snapshot.
    ///
    /// Duplicate ids in the snapshot collapse to their first occurrence.
    pub fn reset(&mut self, items: Vec<Item>, stats: Stats) {
        self.items.clear();
        for item in items {
            if !self.contains(item.id) {
                self.items.push(item);
            }
        }
        self.stats = stats;
    }
}

#[cfg(test)]
#[path = "replica_tests.rs"]
mod tests;
