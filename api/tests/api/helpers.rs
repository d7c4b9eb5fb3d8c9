use std::{
  collections::VecDeque,
  sync::{Arc, Mutex},
  time::Duration,
};

use async_trait::async_trait;
use orbit_api::{
  db::OrbitDb,
  domain::request::{HttpMethod, RequestPatch},
  error::TransportError,
  transport::{Transport, TransportRequest, TransportResponse},
  workspace::Workspace,
  OrbitApi,
};

struct Scripted {
  delay: Duration,
  outcome: Result<TransportResponse, String>,
}

/// Transport that replays scripted outcomes in call order and records every
/// request it was asked to send. Unscripted calls answer 200 with `{}`.
#[derive(Default)]
pub struct FakeTransport {
  script: Mutex<VecDeque<Scripted>>,
  calls: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
  pub fn respond_after(&self, delay_ms: u64, status: u16, body: &str) {
    self.script.lock().unwrap().push_back(Scripted {
      delay: Duration::from_millis(delay_ms),
      outcome: Ok(ok_response(status, body)),
    });
  }

  pub fn fail_with(&self, message: &str) {
    self.script.lock().unwrap().push_back(Scripted {
      delay: Duration::ZERO,
      outcome: Err(message.to_string()),
    });
  }

  pub fn calls(&self) -> Vec<TransportRequest> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn execute(
    &self,
    request: TransportRequest,
  ) -> Result<TransportResponse, TransportError> {
    self.calls.lock().unwrap().push(request);
    let next = self.script.lock().unwrap().pop_front();
    match next {
      Some(scripted) => {
        tokio::time::sleep(scripted.delay).await;
        scripted.outcome.map_err(TransportError::Request)
      }
      None => Ok(ok_response(200, "{}")),
    }
  }
}

pub fn ok_response(status: u16, body: &str) -> TransportResponse {
  TransportResponse {
    status,
    status_text: "OK".into(),
    headers: vec![],
    body: body.to_string(),
    duration_ms: 3,
  }
}

pub struct TestApp {
  pub app: OrbitApi,
  pub transport: Arc<FakeTransport>,
}

pub async fn spawn_test_app() -> TestApp {
  let db = OrbitDb::in_memory().await.expect("in-memory db");
  spawn_test_app_with(db).await
}

pub async fn spawn_test_app_with(db: OrbitDb) -> TestApp {
  let transport = Arc::new(FakeTransport::default());
  let app = OrbitApi::restore(db, transport.clone()).await;
  TestApp { app, transport }
}

impl TestApp {
  pub async fn active_tab_id(&self) -> String {
    self
      .app
      .read(|ws| ws.active_tab_id().map(str::to_string))
      .await
      .expect("an active tab")
  }

  /// Points the active tab at `url` as a configured HTTP request.
  pub async fn http_tab(&self, method: HttpMethod, url: &str) -> String {
    let id = self.active_tab_id().await;
    self
      .app
      .set_protocol(&id, orbit_api::domain::request::Protocol::Http)
      .await;
    self.app.update_tab(&id, edit(method, url)).await;
    id
  }
}

pub fn edit(method: HttpMethod, url: &str) -> RequestPatch {
  RequestPatch {
    method: Some(method),
    url: Some(url.to_string()),
    ..Default::default()
  }
}

/// Fresh workspace with one configured HTTP tab.
pub fn workspace_with_tab(method: HttpMethod, url: &str) -> (Workspace, String) {
  let mut ws = Workspace::new();
  let id = ws.open_new_tab();
  ws.set_protocol(&id, orbit_api::domain::request::Protocol::Http);
  ws.update_tab(&id, edit(method, url));
  (ws, id)
}
