use std::time::Instant;

use async_trait::async_trait;

use crate::domain::request::HttpMethod;
use crate::domain::response::ResponseHeader;
use crate::error::TransportError;
use crate::utilities::{request::build_request, response::read_response};

/// What the workspace hands to a transport for one dispatch.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Raw outcome of a dispatch as reported by the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<ResponseHeader>,
    pub body: String,
    pub duration_ms: u64,
}

/// Executes a single request. Implementations must not touch workspace state.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError>;
}

pub struct ReqwestTransport {
    pub client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        ReqwestTransport {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        log::debug!("Submitting request: {} {}", request.method, request.url);
        let req = build_request(&self.client, &request)?;
        let started = Instant::now();
        let res = req.send().await?;
        read_response(res, started).await
    }
}
