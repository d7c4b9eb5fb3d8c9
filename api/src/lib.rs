pub mod db;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod transport;
pub mod utilities;
pub mod workspace;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use tokio::{sync::Mutex, task::JoinHandle};

use db::{
    session::{restore_session, SessionWriter},
    OrbitDb,
};
use domain::{
    request::{Protocol, Request, RequestPatch},
    ui::Theme,
};
use envelope::ImportSummary;
use error::WorkspaceError;
use transport::Transport;
use workspace::{SaveOutcome, Workspace};

/// The running client: one workspace, the transport it dispatches through,
/// and the writer that persists every change.
///
/// Workspace operations run one at a time under a lock. A dispatch only
/// holds the lock while starting and finishing, so several can be in flight.
pub struct OrbitApi {
    workspace: Mutex<Workspace>,
    transport: Arc<dyn Transport>,
    writer: SessionWriter,
    writer_task: JoinHandle<()>,
}

impl OrbitApi {
    /// Restores the last session from `db` and starts persisting to it.
    pub async fn restore(db: OrbitDb, transport: Arc<dyn Transport>) -> Self {
        let mut workspace = restore_session(&db).await;
        let (writer, writer_task) = SessionWriter::spawn(db);
        writer.persist(&mut workspace);
        OrbitApi {
            workspace: Mutex::new(workspace),
            transport,
            writer,
            writer_task,
        }
    }

    async fn mutate<T>(&self, f: impl FnOnce(&mut Workspace) -> T) -> T {
        let mut workspace = self.workspace.lock().await;
        let out = f(&mut *workspace);
        self.writer.persist(&mut *workspace);
        out
    }

    pub async fn read<T>(&self, f: impl FnOnce(&Workspace) -> T) -> T {
        let workspace = self.workspace.lock().await;
        f(&*workspace)
    }

    /// Point-in-time copy of the whole workspace.
    pub async fn snapshot(&self) -> Workspace {
        self.read(|ws| ws.clone()).await
    }

    pub async fn open_new_tab(&self) -> String {
        self.mutate(|ws| ws.open_new_tab()).await
    }

    pub async fn close_tab(&self, tab_id: &str) {
        self.mutate(|ws| ws.close_tab(tab_id)).await
    }

    pub async fn activate_tab(&self, tab_id: &str) {
        self.mutate(|ws| ws.activate_tab(tab_id)).await
    }

    pub async fn set_protocol(&self, tab_id: &str, protocol: Protocol) {
        self.mutate(|ws| ws.set_protocol(tab_id, protocol)).await
    }

    pub async fn update_tab(&self, tab_id: &str, patch: RequestPatch) {
        self.mutate(|ws| ws.update_tab(tab_id, patch)).await
    }

    pub async fn load_into_tab(&self, request: &Request) -> String {
        self.mutate(|ws| ws.load_into_tab(request)).await
    }

    pub async fn open_request(&self, id: &str) -> Option<String> {
        self.mutate(|ws| ws.open_request(id)).await
    }

    /// Sends the tab's request and records the outcome on the tab and in
    /// history. Returns false when nothing was sent.
    pub async fn dispatch(&self, tab_id: &str) -> bool {
        let Some(ticket) = self.mutate(|ws| ws.begin_dispatch(tab_id)).await else {
            return false;
        };
        let outcome = self.transport.execute(ticket.transport_request()).await;
        match &outcome {
            Ok(res) => log::info!(
                "{} -> {} in {}ms",
                ticket.snapshot.summary(),
                res.status,
                res.duration_ms
            ),
            Err(e) => log::warn!("{} failed: {}", ticket.snapshot.summary(), e),
        }
        self.mutate(move |ws| ws.complete_dispatch(ticket, outcome)).await;
        true
    }

    pub async fn save_or_update(
        &self,
        tab_id: &str,
        name: Option<&str>,
        target_collection_id: Option<&str>,
    ) -> Result<SaveOutcome, WorkspaceError> {
        self.mutate(|ws| ws.save_or_update(tab_id, name, target_collection_id))
            .await
    }

    pub async fn create_collection(&self, name: &str) -> Result<String, WorkspaceError> {
        self.mutate(|ws| ws.create_collection(name)).await
    }

    pub async fn rename_collection(&self, id: &str, name: &str) -> Result<(), WorkspaceError> {
        self.mutate(|ws| ws.rename_collection(id, name)).await
    }

    pub async fn delete_collection(&self, id: &str) -> Result<(), WorkspaceError> {
        self.mutate(|ws| ws.delete_collection(id)).await
    }

    pub async fn delete_saved_request(
        &self,
        collection_id: &str,
        request_id: &str,
    ) -> Result<bool, WorkspaceError> {
        self.mutate(|ws| ws.delete_saved_request(collection_id, request_id))
            .await
    }

    pub async fn toggle_collection_open(&self, id: &str) {
        self.mutate(|ws| ws.toggle_collection_open(id)).await
    }

    pub async fn clear_history(&self) {
        self.mutate(|ws| ws.clear_history()).await
    }

    pub async fn reset_all(&self) {
        self.mutate(|ws| ws.reset_all()).await
    }

    pub async fn set_theme(&self, theme: Theme) {
        self.mutate(|ws| ws.set_theme(theme)).await
    }

    pub async fn export_envelope(&self) -> anyhow::Result<Vec<u8>> {
        Ok(self.read(envelope::export_envelope).await?)
    }

    /// Writes the export into `dir` under a dated backup name.
    pub async fn export_to_dir(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        let bytes = self.export_envelope().await?;
        let path = dir.join(envelope::export_file_name(Utc::now()));
        tokio::fs::write(&path, bytes).await?;
        log::info!("exported workspace to {}", path.display());
        Ok(path)
    }

    pub async fn import_envelope(&self, bytes: &[u8]) -> Result<ImportSummary, WorkspaceError> {
        self.mutate(|ws| envelope::import_envelope(ws, bytes)).await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary, WorkspaceError> {
        log::info!("Reading file: {}", path.display());
        let bytes = tokio::fs::read(path).await?;
        self.import_envelope(&bytes).await
    }

    /// Waits until every change made so far has reached storage.
    pub async fn flush(&self) {
        self.writer.sync().await
    }

    /// Stops the writer after it has applied all queued changes.
    pub async fn shutdown(self) {
        let OrbitApi {
            writer,
            writer_task,
            ..
        } = self;
        drop(writer);
        if let Err(e) = writer_task.await {
            log::error!("session writer did not shut down cleanly: {}", e);
        }
    }
}
