use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use super::cache::TokenCache;
use super::credentials::Credentials;
use super::token::{CacheKey, CachedToken};
use crate::api::http::{read_body, send_error};
use crate::error::{Result, SophosError};

pub const DEFAULT_TOKEN_URL: &str = "https://id.sophos.com/api/v2/oauth2/token";
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(15);
/// Lifetime assumed when the token response omits a usable `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Acquires client-credentials access tokens and caches them per
/// client id and scope.
///
/// No retries are performed; transport and authorization failures are
/// returned to the caller as-is.
///
/// # Example
/// ```no_run
/// use sophos_central::auth::{Credentials, TokenCache, TokenManager};
///
/// # async fn example() -> sophos_central::error::Result<()> {
/// let manager = TokenManager::new(reqwest::Client::new(), TokenCache::new());
/// let token = manager
///     .acquire_token(&Credentials::new("client-id", "client-secret"))
///     .await?;
/// # let _ = token;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenManager {
    client: reqwest::Client,
    cache: TokenCache,
    token_url: String,
    timeout: Duration,
}

impl TokenManager {
    pub fn new(client: reqwest::Client, cache: TokenCache) -> Self {
        Self {
            client,
            cache,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: DEFAULT_TOKEN_TIMEOUT,
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Return a bearer token for `credentials`, exchanging a new one only
    /// when the cached entry is missing or inside the expiry safety margin.
    pub async fn acquire_token(&self, credentials: &Credentials) -> Result<String> {
        let key = CacheKey::from(credentials);
        if let Some(cached) = self.cache.usable(&key, Utc::now()) {
            tracing::debug!(client_id = %key.client_id, scope = %key.scope, "token cache hit");
            return Ok(cached.access_token);
        }

        tracing::info!(
            client_id = %key.client_id,
            scope = %key.scope,
            "requesting client-credentials token"
        );
        let token = self.exchange(credentials).await?;
        let access_token = token.access_token.clone();
        self.cache.store(key, token);
        Ok(access_token)
    }

    async fn exchange(&self, credentials: &Credentials) -> Result<CachedToken> {
        let response = self
            .client
            .post(&self.token_url)
            .timeout(self.timeout)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("scope", credentials.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout))?;
        let body = read_body(response, self.timeout).await?;
        let payload: TokenResponse = serde_json::from_value(body).map_err(|_| {
            SophosError::InvalidTokenResponse("unexpected token response body".to_string())
        })?;

        let access_token = payload
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SophosError::InvalidTokenResponse("missing access_token".to_string())
            })?;
        let expires_in = parse_expires_in(payload.expires_in.as_ref());
        tracing::debug!(expires_in, "token issued");
        Ok(CachedToken::issued(access_token, Utc::now(), expires_in))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<Value>,
}

/// Interpret `expires_in`, falling back to one hour when it is absent, zero,
/// negative, or not a number.
fn parse_expires_in(value: Option<&Value>) -> u64 {
    let secs = match value {
        Some(Value::Number(num)) => num
            .as_u64()
            .or_else(|| num.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64)),
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        _ => None,
    };
    secs.filter(|s| *s > 0).unwrap_or(DEFAULT_EXPIRES_IN_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expires_in_integer_is_used() {
        assert_eq!(parse_expires_in(Some(&json!(1800))), 1800);
    }

    #[test]
    fn expires_in_numeric_string_is_used() {
        assert_eq!(parse_expires_in(Some(&json!("900"))), 900);
    }

    #[test]
    fn expires_in_fraction_truncates() {
        assert_eq!(parse_expires_in(Some(&json!(120.7))), 120);
    }

    #[test]
    fn expires_in_defaults_when_missing_or_invalid() {
        assert_eq!(parse_expires_in(None), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(parse_expires_in(Some(&json!(0))), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(parse_expires_in(Some(&json!(-5))), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(parse_expires_in(Some(&json!("soon"))), DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(parse_expires_in(Some(&Value::Null)), DEFAULT_EXPIRES_IN_SECS);
    }

    #[tokio::test]
    async fn cached_token_short_circuits_exchange() {
        let cache = TokenCache::new();
        let creds = Credentials::new("client", "secret");
        cache.store(
            CacheKey::from(&creds),
            CachedToken::new("cached", Utc::now() + chrono::Duration::hours(1)),
        );
        // Unroutable URL: any network attempt would fail the test.
        let manager = TokenManager::new(reqwest::Client::new(), cache)
            .with_token_url("http://127.0.0.1:9/unreachable");
        assert_eq!(manager.acquire_token(&creds).await.unwrap(), "cached");
    }
}
