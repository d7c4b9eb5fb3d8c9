use orbit_api::{
  domain::{
    request::{HttpMethod, Protocol, RequestPatch, GRAPHQL_TEMPLATE},
    tab::NEW_TAB_NAME,
  },
  workspace::{SaveOutcome, Workspace},
};

use crate::helpers::{ok_response, workspace_with_tab};

fn assert_active_is_open(ws: &Workspace) {
  match ws.active_tab_id() {
    Some(id) => assert!(ws.tab(id).is_some(), "active tab {} is not open", id),
    None => assert_eq!(ws.tab_count(), 0),
  }
}

#[test]
fn new_tab_is_empty_and_active() {
  let mut ws = Workspace::new();
  let id = ws.open_new_tab();
  let tab = ws.tab(&id).unwrap();
  assert_eq!(ws.active_tab_id(), Some(id.as_str()));
  assert_eq!(tab.request.name, NEW_TAB_NAME);
  assert_eq!(tab.request.protocol, Protocol::Empty);
  assert_eq!(tab.request.method, HttpMethod::GET);
  assert!(tab.request.url.is_empty());
  assert!(!tab.is_loading);
}

#[test]
fn closing_the_active_tab_activates_the_last_remaining() {
  let mut ws = Workspace::new();
  let a = ws.open_new_tab();
  let b = ws.open_new_tab();
  let c = ws.open_new_tab();
  ws.activate_tab(&b);
  ws.close_tab(&b);
  assert_eq!(ws.active_tab_id(), Some(c.as_str()));

  ws.close_tab(&a);
  assert_eq!(ws.active_tab_id(), Some(c.as_str()));

  ws.close_tab(&c);
  assert_eq!(ws.active_tab_id(), None);
  assert_eq!(ws.tab_count(), 0);
}

#[test]
fn closing_an_inactive_tab_keeps_the_active_one() {
  let mut ws = Workspace::new();
  let a = ws.open_new_tab();
  let b = ws.open_new_tab();
  ws.close_tab(&a);
  assert_eq!(ws.active_tab_id(), Some(b.as_str()));
  ws.close_tab("not-a-tab");
  assert_eq!(ws.tab_count(), 1);
}

#[test]
fn active_tab_always_points_at_an_open_tab() {
  let mut ws = Workspace::new();
  let mut opened: Vec<String> = vec![];
  // Deterministic mix of opens, closes and activations.
  for step in 0..200usize {
    match step % 7 {
      0 | 3 | 5 => opened.push(ws.open_new_tab()),
      1 | 4 => {
        if !opened.is_empty() {
          let id = opened.remove((step * 31) % opened.len());
          ws.close_tab(&id);
        }
      }
      _ => {
        if !opened.is_empty() {
          let id = opened[(step * 17) % opened.len()].clone();
          ws.activate_tab(&id);
        }
      }
    }
    assert_active_is_open(&ws);
    assert_eq!(ws.tab_count(), opened.len());
  }
}

#[test]
fn tabs_keep_their_opening_order() {
  let mut ws = Workspace::new();
  let ids: Vec<String> = (0..4).map(|_| ws.open_new_tab()).collect();
  ws.activate_tab(&ids[0]);
  let order: Vec<&str> = ws.tabs().map(|t| t.id()).collect();
  assert_eq!(order, ids.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn graphql_switch_sets_post_and_seeds_a_blank_body() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test/graphql");
  ws.set_protocol(&id, Protocol::GraphQl);
  let tab = ws.tab(&id).unwrap();
  assert_eq!(tab.request.protocol, Protocol::GraphQl);
  assert_eq!(tab.request.method, HttpMethod::POST);
  assert_eq!(tab.request.body, GRAPHQL_TEMPLATE);
}

#[test]
fn graphql_switch_keeps_an_existing_body() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test/graphql");
  ws.update_tab(
    &id,
    RequestPatch {
      body: Some("{\"query\":\"{ me { id } }\"}".into()),
      ..Default::default()
    },
  );
  ws.set_protocol(&id, Protocol::GraphQl);
  assert_eq!(ws.tab(&id).unwrap().request.body, "{\"query\":\"{ me { id } }\"}");
}

#[test]
fn selecting_empty_protocol_changes_nothing() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::PUT, "https://api.test");
  ws.take_dirty();
  ws.set_protocol(&id, Protocol::Empty);
  assert_eq!(ws.tab(&id).unwrap().request.protocol, Protocol::Http);
  assert!(ws.take_dirty().is_empty());
}

#[test]
fn update_only_touches_patched_fields() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::DELETE, "https://api.test/items/1");
  ws.update_tab(
    &id,
    RequestPatch {
      name: Some("Remove item".into()),
      ..Default::default()
    },
  );
  let req = &ws.tab(&id).unwrap().request;
  assert_eq!(req.name, "Remove item");
  assert_eq!(req.method, HttpMethod::DELETE);
  assert_eq!(req.url, "https://api.test/items/1");
}

#[test]
fn updating_an_unknown_tab_is_ignored() {
  let (mut ws, _) = workspace_with_tab(HttpMethod::GET, "https://api.test");
  ws.take_dirty();
  ws.update_tab("missing", RequestPatch::default());
  assert!(ws.take_dirty().is_empty());
}

#[test]
fn setting_protocol_on_an_unknown_tab_is_ignored() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test");
  ws.take_dirty();
  ws.set_protocol("missing", Protocol::GraphQl);
  assert!(ws.take_dirty().is_empty());
  assert_eq!(ws.tab_count(), 1);
  let tab = ws.tab(&id).unwrap();
  assert_eq!(tab.request.protocol, Protocol::Http);
  assert_eq!(tab.request.method, HttpMethod::GET);
}

#[test]
fn loading_an_open_request_only_activates_it() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test");
  let request = ws.tab(&id).unwrap().request.clone();
  let other = ws.open_new_tab();
  assert_eq!(ws.active_tab_id(), Some(other.as_str()));

  let loaded = ws.load_into_tab(&request);
  assert_eq!(loaded, id);
  assert_eq!(ws.tab_count(), 2);
  assert_eq!(ws.active_tab_id(), Some(id.as_str()));
}

#[test]
fn dispatch_of_blank_url_does_nothing() {
  let mut ws = Workspace::new();
  let id = ws.open_new_tab();
  ws.set_protocol(&id, Protocol::Http);
  ws.update_tab(
    &id,
    RequestPatch {
      url: Some("   ".into()),
      ..Default::default()
    },
  );
  assert!(ws.begin_dispatch(&id).is_none());
  assert!(!ws.tab(&id).unwrap().is_loading);
}

#[test]
fn dispatch_of_unsupported_protocol_reports_inline() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "wss://api.test/socket");
  ws.set_protocol(&id, Protocol::WebSocket);
  assert!(ws.begin_dispatch(&id).is_none());
  let tab = ws.tab(&id).unwrap();
  assert!(!tab.is_loading);
  assert!(tab.request.error.as_deref().unwrap().starts_with("Error: "));
  assert!(ws.history().is_empty());
}

#[test]
fn begin_dispatch_marks_the_tab_loading() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::POST, " https://api.test/items ");
  let ticket = ws.begin_dispatch(&id).unwrap();
  assert!(ws.tab(&id).unwrap().is_loading);
  assert_eq!(ticket.tab_id, id);
  assert_eq!(ticket.transport_request().url, "https://api.test/items");
  assert_eq!(ticket.transport_request().method, HttpMethod::POST);
}

#[test]
fn completion_follows_a_tab_renamed_by_save_as() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test");
  ws.create_collection("Demo").unwrap();
  let ticket = ws.begin_dispatch(&id).unwrap();
  let SaveOutcome::Created { request_id, .. } = ws.save_or_update(&id, Some("Ping"), None).unwrap()
  else {
    panic!("expected save-as");
  };
  assert!(ws.tab(&request_id).unwrap().is_loading);

  ws.complete_dispatch(ticket, Ok(ok_response(200, "{}")));
  let tab = ws.tab(&request_id).unwrap();
  assert!(!tab.is_loading);
  assert_eq!(tab.request.response.as_ref().map(|r| r.status), Some(200));
  assert_eq!(ws.history().len(), 1);
}

#[test]
fn completion_for_a_renamed_then_closed_tab_only_records_history() {
  let (mut ws, id) = workspace_with_tab(HttpMethod::GET, "https://api.test");
  ws.create_collection("Demo").unwrap();
  let ticket = ws.begin_dispatch(&id).unwrap();
  let SaveOutcome::Created { request_id, .. } = ws.save_or_update(&id, Some("Ping"), None).unwrap()
  else {
    panic!("expected save-as");
  };
  ws.close_tab(&request_id);

  ws.complete_dispatch(ticket, Ok(ok_response(200, "{}")));
  assert_eq!(ws.tab_count(), 0);
  assert_eq!(ws.history().len(), 1);
}

#[test]
fn restored_workspace_drops_duplicate_tabs_and_stale_active_id() {
  let mut ws = Workspace::new();
  let a = ws.open_new_tab();
  let b = ws.open_new_tab();
  let mut tabs: Vec<_> = ws.tabs().cloned().collect();
  tabs.push(ws.tab(&a).unwrap().clone());
  tabs[0].is_loading = true;

  let restored = Workspace::from_parts(
    vec![],
    Default::default(),
    tabs,
    Some("gone".into()),
    Default::default(),
  );
  assert_eq!(restored.tab_count(), 2);
  assert_eq!(restored.active_tab_id(), Some(b.as_str()));
  assert!(restored.tabs().all(|t| !t.is_loading));
}
