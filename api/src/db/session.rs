use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::repository::OrbitDb;
use crate::domain::{
    collection::{collections_are_consistent, Collection},
    history::{History, HistoryEntry},
    tab::Tab,
    ui::Theme,
};
use crate::workspace::Workspace;

/// Independently persisted pieces of the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionKey {
    History,
    Collections,
    Tabs,
    ActiveTab,
    Theme,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::History => "history",
            SessionKey::Collections => "collections",
            SessionKey::Tabs => "tabs",
            SessionKey::ActiveTab => "active_tab_id",
            SessionKey::Theme => "theme",
        }
    }
}

/// Slot payload for `key`, or `None` when the slot should be cleared.
pub fn encode_slot(workspace: &Workspace, key: SessionKey) -> serde_json::Result<Option<String>> {
    let value = match key {
        SessionKey::History => serde_json::to_string(workspace.history())?,
        SessionKey::Collections => serde_json::to_string(workspace.collections())?,
        SessionKey::Tabs => serde_json::to_string(&workspace.tabs().collect::<Vec<_>>())?,
        SessionKey::ActiveTab => match workspace.active_tab_id() {
            Some(id) => serde_json::to_string(id)?,
            None => return Ok(None),
        },
        SessionKey::Theme => serde_json::to_string(&workspace.theme())?,
    };
    Ok(Some(value))
}

async fn read_slot<T: DeserializeOwned>(db: &OrbitDb, key: SessionKey) -> Option<T> {
    match db.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("ignoring unreadable session slot {}: {}", key.as_str(), e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::warn!("could not read session slot {}: {:#}", key.as_str(), e);
            None
        }
    }
}

/// Rebuilds the workspace from the session slots. Each slot is read on its
/// own; a missing or broken slot falls back to its default. A workspace
/// without tabs gets a fresh empty one.
pub async fn restore_session(db: &OrbitDb) -> Workspace {
    let mut collections: Vec<Collection> = read_slot(db, SessionKey::Collections)
        .await
        .unwrap_or_default();
    if !collections_are_consistent(&collections) {
        log::warn!("stored collections contain duplicate ids; starting without them");
        collections = vec![];
    }
    let history: Vec<HistoryEntry> = read_slot(db, SessionKey::History).await.unwrap_or_default();
    let tabs: Vec<Tab> = read_slot(db, SessionKey::Tabs).await.unwrap_or_default();
    let active_tab_id: Option<String> = read_slot(db, SessionKey::ActiveTab).await;
    let theme: Theme = read_slot(db, SessionKey::Theme).await.unwrap_or_default();

    log::info!(
        "restored {} tabs, {} collections, {} history entries",
        tabs.len(),
        collections.len(),
        history.len()
    );
    let mut workspace = Workspace::from_parts(
        collections,
        History::from_entries(history),
        tabs,
        active_tab_id,
        theme,
    );
    if workspace.tab_count() == 0 {
        workspace.open_new_tab();
    }
    workspace
}

enum WriteOp {
    Set(SessionKey, String),
    Remove(SessionKey),
    Sync(oneshot::Sender<()>),
}

/// Queues slot writes to a single background task that applies them in
/// order. Writes are fire-and-forget; failures are logged by the task.
#[derive(Clone)]
pub struct SessionWriter {
    tx: mpsc::UnboundedSender<WriteOp>,
}

impl SessionWriter {
    /// Starts the writer task. It stops once every `SessionWriter` clone has
    /// been dropped and the queue is drained.
    pub fn spawn(db: OrbitDb) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteOp>();
        let handle = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                let result = match op {
                    WriteOp::Set(key, value) => db.set(key, &value).await,
                    WriteOp::Remove(key) => db.remove(key).await,
                    WriteOp::Sync(done) => {
                        let _ = done.send(());
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    log::error!("session write failed: {:#}", e);
                }
            }
            db.close().await;
            log::debug!("session writer stopped");
        });
        (SessionWriter { tx }, handle)
    }

    /// Drains the workspace's dirty slots and queues their new values.
    pub fn persist(&self, workspace: &mut Workspace) {
        for key in workspace.take_dirty() {
            let op = match encode_slot(workspace, key) {
                Ok(Some(value)) => WriteOp::Set(key, value),
                Ok(None) => WriteOp::Remove(key),
                Err(e) => {
                    log::error!("could not encode session slot {}: {}", key.as_str(), e);
                    continue;
                }
            };
            if self.tx.send(op).is_err() {
                log::warn!("session writer is gone; {} not saved", key.as_str());
            }
        }
    }

    /// Resolves once every write queued before this call has been applied.
    pub async fn sync(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(WriteOp::Sync(done)).is_ok() {
            let _ = wait.await;
        }
    }
}
