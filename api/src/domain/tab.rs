use serde::{Deserialize, Serialize};

use super::request::{HttpMethod, Protocol, Request, RequestHeaders};

pub const NEW_TAB_NAME: &str = "New Request";

/// A request open for editing. The tab id is the request id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    #[serde(flatten)]
    pub request: Request,
    #[serde(default, skip_serializing)]
    pub is_loading: bool,
}

impl Tab {
    pub fn empty(id: String) -> Self {
        Self {
            request: Request {
                id,
                name: NEW_TAB_NAME.into(),
                method: HttpMethod::GET,
                url: "".into(),
                headers: RequestHeaders::default(),
                body: "".into(),
                protocol: Protocol::Empty,
                response: None,
                error: None,
                saved_collection_id: None,
            },
            is_loading: false,
        }
    }

    /// Opens a saved or history request with its execution state reset.
    pub fn from_request(request: &Request) -> Self {
        Self {
            request: Request {
                response: None,
                error: None,
                ..request.clone()
            },
            is_loading: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.request.id
    }
}
