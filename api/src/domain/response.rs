use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct ResponseHeader {
    pub key: String,
    pub value: String,
}

/// Result of the last successful dispatch of a request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<ResponseHeader>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub duration_ms: u64,
    /// Byte length of `body`, computed locally rather than taken from the transport.
    #[serde(default)]
    pub size: usize,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status < 400
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    pub fn content_kind(&self) -> ContentKind {
        self.header("content-type")
            .map(crate::utilities::response::content_kind)
            .unwrap_or(ContentKind::Unknown)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Xml,
    Text,
    Unknown,
}
