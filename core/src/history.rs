//! Bounded, newest-first log of past outcomes.
//!
//! RULE: Only `record` mutates the store. Entries are immutable once created;
//! the only removal is tail eviction past capacity.

use crate::{
    error::ConfigError,
    outcome::Outcome,
    types::SequenceNumber,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_DISPLAY_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub sequence:  SequenceNumber,
    pub outcome:   Outcome,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity:       usize,
    pub display_window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity:       DEFAULT_CAPACITY,
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries:       VecDeque<HistoryEntry>,
    capacity:      usize,
    last_sequence: SequenceNumber,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
            last_sequence: 0,
        })
    }

    /// Assign the next sequence number, insert at the head, evict the tail past capacity.
    pub fn record(&mut self, outcome: Outcome, timestamp: DateTime<Utc>) -> HistoryEntry {
        self.last_sequence += 1;
        let entry = HistoryEntry { sequence: self.last_sequence, outcome, timestamp };
        self.entries.push_front(entry.clone());
        if self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_back() {
                log::debug!("history: evicted seq={}", evicted.sequence);
            }
        }
        entry
    }

    /// The newest `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last_sequence(&self) -> SequenceNumber {
        self.last_sequence
    }
}
