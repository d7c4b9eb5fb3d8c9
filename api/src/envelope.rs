use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    collection::{collections_are_consistent, Collection},
    history::{History, HistoryEntry},
};
use crate::error::WorkspaceError;
use crate::workspace::Workspace;

pub const ENVELOPE_VERSION: u32 = 2;

/// Versioned export/import payload. Open tabs are not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub timestamp: String,
    pub collections: Vec<Collection>,
    pub history: Vec<HistoryEntry>,
}

impl Envelope {
    pub fn snapshot(workspace: &Workspace) -> Self {
        Envelope {
            version: ENVELOPE_VERSION,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            collections: workspace.collections().to_vec(),
            history: workspace.history().to_vec(),
        }
    }
}

/// What an import replaced. `None` means the field was absent or unusable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub collections: Option<usize>,
    pub history: Option<usize>,
}

/// Pretty-printed envelope of the current collections and history.
pub fn export_envelope(workspace: &Workspace) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec_pretty(&Envelope::snapshot(workspace))
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("orbitapi_backup_{}.json", at.format("%Y-%m-%d"))
}

/// Applies an exported payload. `collections` and `history` are each
/// replaced wholesale when present as a well-formed list, independently of
/// each other. Open tabs are never touched.
pub fn import_envelope(
    workspace: &mut Workspace,
    bytes: &[u8],
) -> Result<ImportSummary, WorkspaceError> {
    let value: Value = serde_json::from_slice(bytes).map_err(WorkspaceError::MalformedPayload)?;
    match value.get("version").and_then(Value::as_u64) {
        Some(1) | Some(2) | None => {}
        Some(other) => log::warn!("importing envelope with unknown version {}", other),
    }

    let collections = value.get("collections").and_then(parse_collections);
    let history = value.get("history").and_then(parse_history);
    if collections.is_none() && history.is_none() {
        return Err(WorkspaceError::NothingImported);
    }

    let mut summary = ImportSummary::default();
    if let Some(collections) = collections {
        summary.collections = Some(collections.len());
        workspace.replace_collections(collections);
    }
    if let Some(history) = history {
        summary.history = Some(history.len());
        workspace.replace_history(history);
    }
    log::info!("imported {:?}", summary);
    Ok(summary)
}

fn parse_collections(value: &Value) -> Option<Vec<Collection>> {
    value.as_array()?;
    let collections: Vec<Collection> = match serde_json::from_value(value.clone()) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("skipping collections in import: {}", e);
            return None;
        }
    };
    if !collections_are_consistent(&collections) {
        log::warn!("skipping collections in import: duplicate ids");
        return None;
    }
    Some(collections)
}

fn parse_history(value: &Value) -> Option<History> {
    value.as_array()?;
    match serde_json::from_value::<Vec<HistoryEntry>>(value.clone()) {
        Ok(entries) => Some(History::from_entries(entries)),
        Err(e) => {
            log::warn!("skipping history in import: {}", e);
            None
        }
    }
}
