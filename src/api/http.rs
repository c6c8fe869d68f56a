//! Shared HTTP client construction, headers, and response decoding.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::{Result, SophosError};

/// Build the reqwest client used for token exchanges and API calls.
///
/// Per-call deadlines are applied on each request, not here.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .user_agent(concat!("sophos-central/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SophosError::Network)
}

/// Headers for an authenticated JSON API call.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a reqwest send/read failure, distinguishing elapsed deadlines.
pub fn send_error(error: reqwest::Error, timeout: Duration) -> SophosError {
    if error.is_timeout() {
        SophosError::Timeout(timeout.as_millis() as u64)
    } else {
        SophosError::Network(error)
    }
}

/// Check the status and decode the body of a completed response.
pub async fn read_body(response: reqwest::Response, timeout: Duration) -> Result<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| send_error(e, timeout))?;
    if !status.is_success() {
        return Err(SophosError::transport(status.as_u16(), text));
    }
    Ok(decode_body(&text))
}

/// Decode a response body: JSON when possible, otherwise the raw text.
///
/// An empty body decodes to `null`.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
