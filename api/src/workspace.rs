use std::collections::{BTreeSet, HashMap};

use crate::db::session::SessionKey;
use crate::domain::{
    collection::Collection,
    history::History,
    new_id,
    request::{Capability, HttpMethod, Protocol, Request, RequestPatch, GRAPHQL_TEMPLATE},
    response::Response,
    tab::Tab,
    ui::Theme,
};
use crate::error::{TransportError, WorkspaceError};
use crate::transport::{TransportRequest, TransportResponse};

/// Outcome of [`Workspace::save_or_update`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// An existing saved request was overwritten in place.
    Updated { collection_id: String, request_id: String },
    /// The tab was copied into a collection under a new shared id.
    Created { collection_id: String, request_id: String },
}

/// In-flight dispatch of one tab. Holds the request as it was when sent.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchTicket {
    pub tab_id: String,
    pub snapshot: Request,
}

impl DispatchTicket {
    pub fn transport_request(&self) -> TransportRequest {
        TransportRequest {
            method: self.snapshot.method,
            url: self.snapshot.url.trim().to_string(),
            headers: self.snapshot.headers.to_pairs(),
            body: self.snapshot.body.clone(),
        }
    }
}

/// Live workspace: open tabs, collections, history and theme.
///
/// Every mutation records the session slots it changed; the owner drains
/// them with [`Workspace::take_dirty`] and persists them.
#[derive(Clone, Debug, Default)]
pub struct Workspace {
    collections: Vec<Collection>,
    history: History,
    tabs: HashMap<String, Tab>,
    tab_order: Vec<String>,
    active_tab_id: Option<String>,
    theme: Theme,
    dirty: BTreeSet<SessionKey>,
    // Old id -> new id for tabs re-keyed by save-as while a dispatch was in flight.
    renamed: HashMap<String, String>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a workspace from persisted parts. Duplicate tab ids keep the
    /// first occurrence and a stale active id falls back to the last tab.
    pub fn from_parts(
        collections: Vec<Collection>,
        history: History,
        tabs: Vec<Tab>,
        active_tab_id: Option<String>,
        theme: Theme,
    ) -> Self {
        let mut workspace = Workspace {
            collections: normalize_collections(collections),
            history,
            theme,
            ..Default::default()
        };
        for mut tab in tabs {
            if workspace.tabs.contains_key(tab.id()) {
                continue;
            }
            tab.is_loading = false;
            workspace.tab_order.push(tab.id().to_string());
            workspace.tabs.insert(tab.id().to_string(), tab);
        }
        workspace.active_tab_id = match active_tab_id {
            Some(id) if workspace.tabs.contains_key(&id) => Some(id),
            _ => workspace.tab_order.last().cloned(),
        };
        workspace
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Open tabs in the order they were opened.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tab_order.iter().filter_map(|id| self.tabs.get(id))
    }

    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.get(id)
    }

    pub fn tab_count(&self) -> usize {
        self.tab_order.len()
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.tabs.get(id))
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Whether the tab's saved copy still exists in its collection.
    pub fn is_saved(&self, tab_id: &str) -> bool {
        self.tabs
            .get(tab_id)
            .and_then(|tab| self.resolve_saved(&tab.request))
            .is_some()
    }

    /// Session slots changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<SessionKey> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    fn touch(&mut self, keys: &[SessionKey]) {
        self.dirty.extend(keys.iter().copied());
    }

    // ---- tabs ----

    pub fn open_new_tab(&mut self) -> String {
        let tab = Tab::empty(new_id());
        let id = tab.id().to_string();
        self.insert_tab(tab);
        id
    }

    fn insert_tab(&mut self, tab: Tab) {
        let id = tab.id().to_string();
        self.tab_order.push(id.clone());
        self.tabs.insert(id.clone(), tab);
        self.active_tab_id = Some(id);
        self.touch(&[SessionKey::Tabs, SessionKey::ActiveTab]);
    }

    pub fn close_tab(&mut self, id: &str) {
        if self.tabs.remove(id).is_none() {
            return;
        }
        self.tab_order.retain(|t| t != id);
        if self.active_tab_id.as_deref() == Some(id) {
            self.active_tab_id = self.tab_order.last().cloned();
        }
        self.renamed.retain(|_, to| to.as_str() != id);
        self.touch(&[SessionKey::Tabs, SessionKey::ActiveTab]);
    }

    pub fn activate_tab(&mut self, id: &str) {
        if self.tabs.contains_key(id) && self.active_tab_id.as_deref() != Some(id) {
            self.active_tab_id = Some(id.to_string());
            self.touch(&[SessionKey::ActiveTab]);
        }
    }

    /// Configures the tab's protocol and applies its defaults. Selecting
    /// `Empty` or naming an unknown tab does nothing.
    pub fn set_protocol(&mut self, tab_id: &str, protocol: Protocol) {
        if protocol == Protocol::Empty {
            return;
        }
        let Some(tab) = self.tabs.get_mut(tab_id) else {
            return;
        };
        let request = &mut tab.request;
        request.protocol = protocol;
        if protocol == Protocol::GraphQl {
            request.method = HttpMethod::POST;
            if request.body.trim().is_empty() {
                request.body = GRAPHQL_TEMPLATE.to_string();
            }
        }
        self.touch(&[SessionKey::Tabs]);
    }

    pub fn update_tab(&mut self, tab_id: &str, patch: RequestPatch) {
        let Some(tab) = self.tabs.get_mut(tab_id) else {
            return;
        };
        apply_patch(tab, patch);
        self.touch(&[SessionKey::Tabs]);
    }

    /// Opens `request` in a tab, or activates the tab already showing it.
    pub fn load_into_tab(&mut self, request: &Request) -> String {
        if self.tabs.contains_key(&request.id) {
            self.activate_tab(&request.id);
        } else {
            self.insert_tab(Tab::from_request(request));
        }
        request.id.clone()
    }

    /// Loads a saved request or a history entry by id, saved requests first.
    pub fn open_request(&mut self, id: &str) -> Option<String> {
        let saved = self.collections.iter().find_map(|c| {
            c.request(id).map(|r| Request {
                saved_collection_id: Some(c.id.clone()),
                ..r.clone()
            })
        });
        let request = saved.or_else(|| self.history.get(id).cloned())?;
        Some(self.load_into_tab(&request))
    }

    // ---- dispatch ----

    /// Marks the tab as loading and captures what will be sent. Returns
    /// `None` when there is nothing to send; protocols without a transport get
    /// an inline error instead.
    pub fn begin_dispatch(&mut self, tab_id: &str) -> Option<DispatchTicket> {
        let tab = self.tabs.get_mut(tab_id)?;
        if tab.request.url.trim().is_empty() {
            return None;
        }
        match tab.request.protocol.capability() {
            Capability::Http => {}
            Capability::Unimplemented | Capability::Unconfigured => {
                let err = TransportError::Unsupported(tab.request.protocol.to_string());
                tab.request.response = None;
                tab.request.error = Some(format!("Error: {}", err));
                tab.is_loading = false;
                self.touch(&[SessionKey::Tabs]);
                return None;
            }
        }
        tab.is_loading = true;
        tab.request.error = None;
        tab.request.response = None;
        let ticket = DispatchTicket {
            tab_id: tab_id.to_string(),
            snapshot: tab.request.clone(),
        };
        self.touch(&[SessionKey::Tabs]);
        Some(ticket)
    }

    /// Records the outcome of a dispatch. Successful dispatches always land
    /// in history; the tab itself is only updated if it is still open.
    pub fn complete_dispatch(
        &mut self,
        ticket: DispatchTicket,
        outcome: Result<TransportResponse, TransportError>,
    ) {
        let patch = match outcome {
            Ok(res) => {
                self.history.record(&ticket.snapshot);
                self.touch(&[SessionKey::History]);
                RequestPatch {
                    response: Some(Some(Response {
                        size: res.body.len(),
                        status: res.status,
                        status_text: res.status_text,
                        headers: res.headers,
                        body: res.body,
                        duration_ms: res.duration_ms,
                    })),
                    error: Some(None),
                    is_loading: Some(false),
                    ..Default::default()
                }
            }
            Err(err) => RequestPatch {
                response: Some(None),
                error: Some(Some(format!("Error: {}", err))),
                is_loading: Some(false),
                ..Default::default()
            },
        };
        let tab_id = self.resolve_renamed(&ticket.tab_id);
        if !self.tabs.contains_key(&tab_id) {
            log::debug!("tab {} closed before its response arrived", ticket.tab_id);
            return;
        }
        self.update_tab(&tab_id, patch);
    }

    /// Current id of a tab that may have been re-keyed since a ticket was issued.
    fn resolve_renamed(&self, id: &str) -> String {
        let mut current = id;
        while let Some(next) = self.renamed.get(current) {
            current = next;
        }
        current.to_string()
    }

    // ---- saving ----

    fn resolve_saved(&self, request: &Request) -> Option<(usize, usize)> {
        let collection_id = request.saved_collection_id.as_deref()?;
        let ci = self.collections.iter().position(|c| c.id == collection_id)?;
        let ri = self.collections[ci]
            .requests
            .iter()
            .position(|r| r.id == request.id)?;
        Some((ci, ri))
    }

    /// Updates the tab's saved copy in place, or saves it as a new request.
    ///
    /// Save-as needs at least one collection and a non-blank name; the target
    /// defaults to the first collection.
    pub fn save_or_update(
        &mut self,
        tab_id: &str,
        name: Option<&str>,
        target_collection_id: Option<&str>,
    ) -> Result<SaveOutcome, WorkspaceError> {
        let tab = self
            .tabs
            .get(tab_id)
            .ok_or_else(|| WorkspaceError::UnknownTab(tab_id.to_string()))?;

        if let Some((ci, ri)) = self.resolve_saved(&tab.request) {
            let collection_id = self.collections[ci].id.clone();
            let mut saved = tab.request.detached_copy(tab.request.id.clone());
            saved.saved_collection_id = Some(collection_id.clone());
            self.collections[ci].requests[ri] = saved;
            self.touch(&[SessionKey::Collections]);
            return Ok(SaveOutcome::Updated {
                collection_id,
                request_id: tab_id.to_string(),
            });
        }

        if self.collections.is_empty() {
            return Err(WorkspaceError::NoCollections);
        }
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(WorkspaceError::InvalidName);
        }
        let ci = match target_collection_id {
            Some(id) => self
                .collections
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| WorkspaceError::UnknownCollection(id.to_string()))?,
            None => 0,
        };

        let collection_id = self.collections[ci].id.clone();
        let request_id = new_id();
        let Some(mut tab) = self.tabs.remove(tab_id) else {
            return Err(WorkspaceError::UnknownTab(tab_id.to_string()));
        };
        tab.request.id = request_id.clone();
        tab.request.name = name.to_string();
        tab.request.saved_collection_id = Some(collection_id.clone());

        let mut saved = tab.request.detached_copy(request_id.clone());
        saved.saved_collection_id = Some(collection_id.clone());
        self.collections[ci].requests.push(saved);

        if tab.is_loading {
            self.renamed.insert(tab_id.to_string(), request_id.clone());
        }
        for id in self.tab_order.iter_mut().filter(|id| id.as_str() == tab_id) {
            *id = request_id.clone();
        }
        if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = Some(request_id.clone());
        }
        self.tabs.insert(request_id.clone(), tab);
        self.touch(&[
            SessionKey::Collections,
            SessionKey::Tabs,
            SessionKey::ActiveTab,
        ]);
        Ok(SaveOutcome::Created {
            collection_id,
            request_id,
        })
    }

    // ---- collections ----

    pub fn create_collection(&mut self, name: &str) -> Result<String, WorkspaceError> {
        let name = valid_name(name)?;
        let id = new_id();
        self.collections.push(Collection::new(id.clone(), name));
        self.touch(&[SessionKey::Collections]);
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<(), WorkspaceError> {
        let name = valid_name(name)?;
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| WorkspaceError::UnknownCollection(id.to_string()))?;
        collection.name = name;
        self.touch(&[SessionKey::Collections]);
        Ok(())
    }

    /// Removes the collection with all its saved requests. Open tabs that
    /// were saved into it become unsaved.
    pub fn delete_collection(&mut self, id: &str) -> Result<(), WorkspaceError> {
        let index = self
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| WorkspaceError::UnknownCollection(id.to_string()))?;
        self.collections.remove(index);
        self.touch(&[SessionKey::Collections]);
        self.detach_tabs(|r| r.saved_collection_id.as_deref() == Some(id));
        Ok(())
    }

    pub fn delete_saved_request(
        &mut self,
        collection_id: &str,
        request_id: &str,
    ) -> Result<bool, WorkspaceError> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| WorkspaceError::UnknownCollection(collection_id.to_string()))?;
        let before = collection.requests.len();
        collection.requests.retain(|r| r.id != request_id);
        if collection.requests.len() == before {
            return Ok(false);
        }
        self.touch(&[SessionKey::Collections]);
        self.detach_tabs(|r| {
            r.id == request_id && r.saved_collection_id.as_deref() == Some(collection_id)
        });
        Ok(true)
    }

    pub fn toggle_collection_open(&mut self, id: &str) {
        if let Some(collection) = self.collections.iter_mut().find(|c| c.id == id) {
            collection.is_open = !collection.is_open;
            self.touch(&[SessionKey::Collections]);
        }
    }

    fn detach_tabs(&mut self, matches: impl Fn(&Request) -> bool) {
        let mut changed = false;
        for tab in self.tabs.values_mut() {
            if tab.request.saved_collection_id.is_some() && matches(&tab.request) {
                tab.request.saved_collection_id = None;
                changed = true;
            }
        }
        if changed {
            self.touch(&[SessionKey::Tabs]);
        }
    }

    // ---- history & bulk ----

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.touch(&[SessionKey::History]);
    }

    /// Empties collections and history. Tabs stay open but lose their
    /// saved-collection references.
    pub fn reset_all(&mut self) {
        self.collections.clear();
        self.history.clear();
        self.touch(&[SessionKey::Collections, SessionKey::History]);
        self.detach_tabs(|_| true);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.touch(&[SessionKey::Theme]);
    }

    /// Wholesale replacement used by import. Callers validate beforehand.
    pub fn replace_collections(&mut self, collections: Vec<Collection>) {
        self.collections = normalize_collections(collections);
        self.touch(&[SessionKey::Collections]);
    }

    pub fn replace_history(&mut self, history: History) {
        self.history = history;
        self.touch(&[SessionKey::History]);
    }
}

fn valid_name(name: &str) -> Result<String, WorkspaceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WorkspaceError::InvalidName);
    }
    Ok(name.to_string())
}

fn apply_patch(tab: &mut Tab, patch: RequestPatch) {
    let request = &mut tab.request;
    if let Some(name) = patch.name {
        request.name = name;
    }
    if let Some(method) = patch.method {
        request.method = method;
    }
    if let Some(url) = patch.url {
        request.url = url;
    }
    if let Some(headers) = patch.headers {
        request.headers = headers;
    }
    if let Some(body) = patch.body {
        request.body = body;
    }
    if let Some(response) = patch.response {
        request.response = response;
    }
    if let Some(error) = patch.error {
        request.error = error;
    }
    if let Some(is_loading) = patch.is_loading {
        tab.is_loading = is_loading;
    }
}

// Saved requests always point back at the collection holding them and never
// carry execution state.
fn normalize_collections(collections: Vec<Collection>) -> Vec<Collection> {
    collections
        .into_iter()
        .map(|mut c| {
            for r in c.requests.iter_mut() {
                r.saved_collection_id = Some(c.id.clone());
                r.response = None;
                r.error = None;
            }
            c
        })
        .collect()
}
