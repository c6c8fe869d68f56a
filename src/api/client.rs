use std::time::Duration;

use reqwest::{Method, Url};
use serde_json::Value;

use super::http::{bearer_headers, read_body, send_error};
use crate::auth::{Credentials, TokenManager};
use crate::error::{Result, SophosError};

pub const DEFAULT_API_BASE_URL: &str = "https://api.central.sophos.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Authenticated client for the Sophos Central API.
///
/// Every request is pinned to the configured base host; paths are appended
/// to it verbatim. A bearer token is resolved through the shared
/// [`TokenManager`] before each call.
#[derive(Debug, Clone)]
pub struct SophosClient {
    http: reqwest::Client,
    tokens: TokenManager,
    credentials: Credentials,
    base_url: String,
    timeout: Duration,
    pub(crate) max_pages: Option<usize>,
}

impl SophosClient {
    pub fn new(http: reqwest::Client, tokens: TokenManager, credentials: Credentials) -> Self {
        Self {
            http,
            tokens,
            credentials,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pages: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stop pagination walks after this many pages. `None` walks until the
    /// server stops returning a cursor.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Issue a single authenticated request and decode its body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self.tokens.acquire_token(&self.credentials).await?;
        let url = self.url_for(path)?;
        tracing::debug!(%method, path = url.path(), "sophos request");

        let mut request = self
            .http
            .request(method, url)
            .headers(bearer_headers(&token))
            .timeout(self.timeout);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;
        read_body(response, self.timeout).await
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        self.request(Method::POST, path, &[], body).await
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let raw = if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        };
        Url::parse(&raw)
            .map_err(|e| SophosError::Configuration(format!("invalid request URL {raw}: {e}")))
    }
}
