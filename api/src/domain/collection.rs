use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::request::Request;

/// A named, ordered group of saved requests.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub requests: Vec<Request>,
    // Expanded/collapsed in the sidebar; carried with the data for convenience.
    #[serde(default = "default_open")]
    pub is_open: bool,
}

fn default_open() -> bool {
    true
}

impl Collection {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            requests: vec![],
            is_open: true,
        }
    }

    pub fn request(&self, id: &str) -> Option<&Request> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn has_unique_request_ids(&self) -> bool {
        let mut seen = HashSet::new();
        self.requests.iter().all(|r| seen.insert(r.id.as_str()))
    }
}

/// True when no two collections share an id and every collection keeps its
/// request ids unique.
pub fn collections_are_consistent(collections: &[Collection]) -> bool {
    let mut seen = HashSet::new();
    collections
        .iter()
        .all(|c| seen.insert(c.id.as_str()) && c.has_unique_request_ids())
}
