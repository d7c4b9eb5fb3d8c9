use chrono::{TimeZone, Utc};
use orbit_api::{
  domain::{
    history::HISTORY_CAPACITY,
    request::{HttpMethod, Protocol},
  },
  envelope::{export_envelope, export_file_name, import_envelope, Envelope, ENVELOPE_VERSION},
  error::WorkspaceError,
  workspace::Workspace,
};
use serde_json::json;

use crate::helpers::{ok_response, spawn_test_app, workspace_with_tab};

fn populated_workspace() -> Workspace {
  let (mut ws, tab_id) = workspace_with_tab(HttpMethod::POST, "https://api.test/items");
  ws.create_collection("Demo").unwrap();
  ws.save_or_update(&tab_id, Some("Create item"), None).unwrap();
  let id = ws.active_tab_id().unwrap().to_string();
  let ticket = ws.begin_dispatch(&id).unwrap();
  ws.complete_dispatch(ticket, Ok(ok_response(201, "{\"id\":1}")));
  ws
}

#[test]
fn export_then_import_restores_collections_and_history() {
  let source = populated_workspace();
  let bytes = export_envelope(&source).unwrap();

  let envelope: Envelope = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(envelope.version, ENVELOPE_VERSION);
  assert!(envelope.timestamp.ends_with('Z'));

  let mut target = Workspace::new();
  let tab = target.open_new_tab();
  let summary = import_envelope(&mut target, &bytes).unwrap();
  assert_eq!(summary.collections, Some(1));
  assert_eq!(summary.history, Some(1));
  assert_eq!(target.collections(), source.collections());
  assert_eq!(target.history(), source.history());
  assert_eq!(target.tab_count(), 1);
  assert!(target.tab(&tab).is_some());
}

#[test]
fn export_omits_tabs_and_execution_state() {
  let source = populated_workspace();
  let bytes = export_envelope(&source).unwrap();
  let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
  assert!(value.get("tabs").is_none());
  let saved = &value["collections"][0]["requests"][0];
  assert!(saved.get("response").is_none());
  assert_eq!(value["history"][0]["name"], "POST https://api.test/items");
}

#[test]
fn non_array_collections_import_nothing() {
  let mut ws = populated_workspace();
  let before = ws.collections().to_vec();
  let err = import_envelope(&mut ws, br#"{"collections": "not-an-array"}"#).unwrap_err();
  assert!(matches!(err, WorkspaceError::NothingImported));
  assert_eq!(ws.collections(), before.as_slice());
}

#[test]
fn malformed_json_is_reported() {
  let mut ws = populated_workspace();
  let before = ws.history().clone();
  let err = import_envelope(&mut ws, b"{ not json").unwrap_err();
  assert!(matches!(err, WorkspaceError::MalformedPayload(_)));
  assert_eq!(err.to_string(), "Failed to parse JSON file.");
  assert_eq!(ws.history(), &before);
}

#[test]
fn fields_are_imported_independently() {
  let mut ws = populated_workspace();
  let collections = ws.collections().to_vec();
  let payload = json!({
    "version": 2,
    "collections": {"oops": true},
    "history": [
      {"id": "h1", "name": "GET https://a", "method": "GET", "url": "https://a", "body": ""}
    ]
  });
  let summary = import_envelope(&mut ws, payload.to_string().as_bytes()).unwrap();
  assert_eq!(summary.collections, None);
  assert_eq!(summary.history, Some(1));
  assert_eq!(ws.collections(), collections.as_slice());
  assert_eq!(ws.history().get("h1").unwrap().url, "https://a");
}

#[test]
fn version_one_payloads_default_to_http() {
  let mut ws = Workspace::new();
  let payload = json!({
    "version": 1,
    "timestamp": "2024-03-01T10:00:00.000Z",
    "collections": [{
      "id": "c1",
      "name": "Legacy",
      "requests": [
        {"id": "r1", "name": "Ping", "method": "GET", "url": "https://legacy", "body": ""}
      ]
    }],
    "history": []
  });
  import_envelope(&mut ws, payload.to_string().as_bytes()).unwrap();
  let saved = ws.collection("c1").unwrap().request("r1").unwrap();
  assert_eq!(saved.protocol, Protocol::Http);
  assert_eq!(saved.saved_collection_id.as_deref(), Some("c1"));
  assert!(ws.collection("c1").unwrap().is_open);
}

#[test]
fn lower_case_methods_are_accepted_on_import() {
  let mut ws = Workspace::new();
  let payload = json!({
    "collections": [{
      "id": "c1",
      "name": "Hand written",
      "requests": [{"id": "r1", "name": "Ping", "method": "get", "url": "https://a"}]
    }]
  });
  let summary = import_envelope(&mut ws, payload.to_string().as_bytes()).unwrap();
  assert_eq!(summary.collections, Some(1));
  let saved = ws.collection("c1").unwrap().request("r1").unwrap();
  assert_eq!(saved.method, HttpMethod::GET);
}

#[test]
fn collections_with_duplicate_ids_are_skipped() {
  let mut ws = Workspace::new();
  let payload = json!({
    "collections": [
      {"id": "c1", "name": "A", "requests": []},
      {"id": "c1", "name": "B", "requests": []}
    ]
  });
  let err = import_envelope(&mut ws, payload.to_string().as_bytes()).unwrap_err();
  assert!(matches!(err, WorkspaceError::NothingImported));
  assert!(ws.collections().is_empty());
}

#[test]
fn imported_history_is_capped() {
  let mut ws = Workspace::new();
  let entries: Vec<_> = (0..HISTORY_CAPACITY + 10)
    .map(|i| json!({"id": format!("h{}", i), "method": "GET", "url": format!("https://a/{}", i)}))
    .collect();
  let payload = json!({ "history": entries });
  let summary = import_envelope(&mut ws, payload.to_string().as_bytes()).unwrap();
  assert_eq!(summary.history, Some(HISTORY_CAPACITY));
  assert_eq!(ws.history().len(), HISTORY_CAPACITY);
  assert_eq!(ws.history().iter().next().unwrap().id, "h0");
}

#[test]
fn backup_file_is_named_by_date() {
  let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
  assert_eq!(export_file_name(at), "orbitapi_backup_2024-03-09.json");
}

#[tokio::test]
async fn export_to_dir_and_import_file_round_trip() {
  let source = spawn_test_app().await;
  let tab = source.http_tab(HttpMethod::GET, "https://api.test/ping").await;
  source.app.create_collection("Demo").await.unwrap();
  source.app.save_or_update(&tab, Some("Ping"), None).await.unwrap();

  let dir = tempfile::tempdir().unwrap();
  let path = source.app.export_to_dir(dir.path()).await.unwrap();
  assert!(path
    .file_name()
    .unwrap()
    .to_string_lossy()
    .starts_with("orbitapi_backup_"));

  let target = spawn_test_app().await;
  let summary = target.app.import_file(&path).await.unwrap();
  assert_eq!(summary.collections, Some(1));
  let names: Vec<String> = target
    .app
    .read(|ws| ws.collections().iter().map(|c| c.name.clone()).collect())
    .await;
  assert_eq!(names, vec!["Demo".to_string()]);
}

#[tokio::test]
async fn importing_a_missing_file_is_an_io_error() {
  let app = spawn_test_app().await;
  let dir = tempfile::tempdir().unwrap();
  let err = app
    .app
    .import_file(&dir.path().join("missing.json"))
    .await
    .unwrap_err();
  assert!(matches!(err, WorkspaceError::Io(_)));
}
