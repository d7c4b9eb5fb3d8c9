use std::time::Instant;

use crate::domain::response::{ContentKind, ResponseHeader};
use crate::error::TransportError;
use crate::transport::TransportResponse;

/// Classifies a `content-type` value for display.
pub fn content_kind(res_type: &str) -> ContentKind {
    let res_type = res_type.trim().to_ascii_lowercase();
    if res_type.starts_with("application/json") || res_type.contains("+json") {
        ContentKind::Json
    } else if res_type.starts_with("application/xml")
        || res_type.starts_with("text/xml")
        || res_type.contains("+xml")
    {
        ContentKind::Xml
    } else if res_type.starts_with("text/") {
        ContentKind::Text
    } else {
        ContentKind::Unknown
    }
}

pub async fn read_response(
    res: reqwest::Response,
    started: Instant,
) -> Result<TransportResponse, TransportError> {
    let status = res.status();
    let headers = res
        .headers()
        .iter()
        .map(|(k, v)| ResponseHeader {
            key: k.to_string(),
            value: v.to_str().unwrap_or("").to_string(),
        })
        .collect();
    let body = res.text().await?;
    Ok(TransportResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        headers,
        body,
        duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}
