use crate::domain::request::HttpMethod;
use crate::error::TransportError;
use crate::transport::TransportRequest;
use reqwest::{header::CONTENT_TYPE, Method};

pub fn convert_http_method(input: HttpMethod) -> Method {
    match input {
        HttpMethod::GET => Method::GET,
        HttpMethod::POST => Method::POST,
        HttpMethod::PUT => Method::PUT,
        HttpMethod::PATCH => Method::PATCH,
        HttpMethod::DELETE => Method::DELETE,
        HttpMethod::HEAD => Method::HEAD,
        HttpMethod::OPTIONS => Method::OPTIONS,
    }
}

/// Turns a transport request into a reqwest builder. A non-empty body goes
/// out as JSON unless the caller set its own content type.
pub fn build_request(
    client: &reqwest::Client,
    input: &TransportRequest,
) -> Result<reqwest::RequestBuilder, TransportError> {
    let url = url::Url::parse(input.url.trim()).map_err(|e| TransportError::InvalidUrl {
        url: input.url.clone(),
        reason: e.to_string(),
    })?;
    let mut req = client.request(convert_http_method(input.method), url);
    for (key, value) in &input.headers {
        req = req.header(key.as_str(), value.as_str());
    }
    if !input.body.is_empty() {
        let has_content_type = input
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
        if !has_content_type {
            req = req.header(CONTENT_TYPE, "application/json");
        }
        req = req.body(input.body.clone());
    }
    Ok(req)
}
