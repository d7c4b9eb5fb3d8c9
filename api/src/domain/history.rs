use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::new_id;
use super::request::Request;

pub const HISTORY_CAPACITY: usize = 50;

/// Snapshot of a request at the moment it was dispatched.
pub type HistoryEntry = Request;

/// Most-recent-first list of dispatched requests, bounded at
/// [`HISTORY_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut entries: VecDeque<HistoryEntry> = entries
            .into_iter()
            .map(|mut e| {
                e.saved_collection_id = None;
                e.response = None;
                e.error = None;
                e
            })
            .collect();
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Records a dispatch of `request`, evicting the oldest entry past capacity.
    pub fn record(&mut self, request: &Request) -> &HistoryEntry {
        let mut entry = request.detached_copy(new_id());
        entry.name = request.summary();
        self.entries.push_front(entry);
        self.entries.truncate(HISTORY_CAPACITY);
        &self.entries[0]
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
