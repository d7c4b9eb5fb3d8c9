use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::response::Response;

// Parsed through `FromStr` so stored and imported methods are case-insensitive.
#[derive(Clone, Copy, Serialize, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(try_from = "String")]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
    HEAD,
}
impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct HttpMethodParseError(pub String);
impl std::fmt::Display for HttpMethodParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown http method {}", self.0)
    }
}
impl std::error::Error for HttpMethodParseError {}

impl FromStr for HttpMethod {
    type Err = HttpMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "PATCH" => Ok(HttpMethod::PATCH),
            "DELETE" => Ok(HttpMethod::DELETE),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "HEAD" => Ok(HttpMethod::HEAD),
            _ => Err(HttpMethodParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = HttpMethodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What the workspace can do with a request of a given protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// Sent through the HTTP transport.
    Http,
    /// Selectable and persisted, but dispatch is not implemented.
    Unimplemented,
    /// Placeholder tab that has not picked a protocol yet.
    Unconfigured,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum Protocol {
    // Payloads written before protocols existed carry no tag and were all HTTP.
    #[default]
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "GraphQL")]
    GraphQl,
    #[serde(rename = "gRPC")]
    Grpc,
    #[serde(rename = "WebSocket")]
    WebSocket,
    #[serde(rename = "SocketIO")]
    SocketIo,
    #[serde(rename = "MQTT")]
    Mqtt,
    #[serde(rename = "EMPTY")]
    Empty,
}

pub const GRAPHQL_TEMPLATE: &str = "{\n  \"query\": \"query {\\n  \\n}\",\n  \"variables\": {}\n}";

impl Protocol {
    pub fn capability(&self) -> Capability {
        match self {
            Protocol::Http | Protocol::GraphQl => Capability::Http,
            Protocol::Grpc | Protocol::WebSocket | Protocol::SocketIo | Protocol::Mqtt => {
                Capability::Unimplemented
            }
            Protocol::Empty => Capability::Unconfigured,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::GraphQl => "GraphQL",
            Protocol::Grpc => "gRPC",
            Protocol::WebSocket => "WebSocket",
            Protocol::SocketIo => "SocketIO",
            Protocol::Mqtt => "MQTT",
            Protocol::Empty => "EMPTY",
        }
    }
}
impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProtocolParseError(pub String);
impl std::fmt::Display for ProtocolParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown protocol {}", self.0)
    }
}
impl std::error::Error for ProtocolParseError {}

impl FromStr for Protocol {
    type Err = ProtocolParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "graphql" => Ok(Protocol::GraphQl),
            "grpc" => Ok(Protocol::Grpc),
            "websocket" => Ok(Protocol::WebSocket),
            "socketio" => Ok(Protocol::SocketIo),
            "mqtt" => Ok(Protocol::Mqtt),
            "empty" => Ok(Protocol::Empty),
            _ => Err(ProtocolParseError(s.to_string())),
        }
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug)]
pub struct RequestHeader {
    pub key: String,
    pub value: String,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct RequestHeaders(pub Vec<RequestHeader>);
impl FromIterator<(String, String)> for RequestHeaders {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut h = RequestHeaders(Vec::new());
        for (k, v) in iter {
            h.0.push(RequestHeader { key: k, value: v });
        }
        h
    }
}
impl RequestHeaders {
    /// Key/value pairs with blank keys dropped and later duplicates ignored.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut seen = std::collections::HashSet::new();
        self.0
            .iter()
            .filter(|h| !h.key.trim().is_empty())
            .filter(|h| seen.insert(h.key.to_ascii_lowercase()))
            .map(|h| (h.key.clone(), h.value.clone()))
            .collect()
    }
}

/// A composable API call. Open tabs, saved collection entries and history
/// entries all share this shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "is_empty_headers")]
    pub headers: RequestHeaders,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_collection_id: Option<String>,
}

fn is_empty_headers(headers: &RequestHeaders) -> bool {
    headers.0.is_empty()
}

impl Request {
    /// Copy of the composable fields under a new id, without execution state
    /// or collection membership.
    pub fn detached_copy(&self, id: String) -> Self {
        Self {
            id,
            response: None,
            error: None,
            saved_collection_id: None,
            ..self.clone()
        }
    }

    /// Label used for history entries.
    pub fn summary(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// Fields a tab edit may change. `None` leaves the field as it is; the
/// nested options on `response`/`error` allow clearing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestPatch {
    pub name: Option<String>,
    pub method: Option<HttpMethod>,
    pub url: Option<String>,
    pub headers: Option<RequestHeaders>,
    pub body: Option<String>,
    pub response: Option<Option<Response>>,
    pub error: Option<Option<String>>,
    pub is_loading: Option<bool>,
}
