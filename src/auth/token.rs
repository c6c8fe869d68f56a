use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::credentials::Credentials;

/// Tokens closer than this to expiry are treated as already expired.
pub const EXPIRY_SAFETY_MARGIN_MS: i64 = 5_000;

/// Identity a cached token belongs to.
///
/// Client id and scope are kept as separate fields so no choice of separator
/// can make two different pairs collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub client_id: String,
    pub scope: String,
}

impl CacheKey {
    pub fn new(client_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: scope.into(),
        }
    }
}

impl From<&Credentials> for CacheKey {
    fn from(credentials: &Credentials) -> Self {
        Self::new(&credentials.client_id, &credentials.scope)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.client_id, self.scope)
    }
}

/// Bearer token held in the [`TokenCache`](super::TokenCache).
///
/// # Example
/// ```
/// use chrono::{Duration, Utc};
/// use sophos_central::auth::CachedToken;
///
/// let token = CachedToken::new("access", Utc::now() + Duration::hours(1));
/// assert!(token.is_usable(Utc::now()));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Build an entry expiring `expires_in_secs` after `issued_at`.
    pub fn issued(
        access_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_in_secs: u64,
    ) -> Self {
        let expires_at = i64::try_from(expires_in_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(access_token, expires_at)
    }

    /// True while `now` is before expiry minus the safety margin.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::milliseconds(EXPIRY_SAFETY_MARGIN_MS) > now
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_inside_safety_margin_is_not_usable() {
        let now = Utc::now();
        let token = CachedToken::new("t", now + Duration::milliseconds(4_999));
        assert!(!token.is_usable(now));
    }

    #[test]
    fn token_exactly_at_margin_is_not_usable() {
        let now = Utc::now();
        let token = CachedToken::new("t", now + Duration::milliseconds(EXPIRY_SAFETY_MARGIN_MS));
        assert!(!token.is_usable(now));
    }

    #[test]
    fn token_past_margin_is_usable() {
        let now = Utc::now();
        let token = CachedToken::new("t", now + Duration::milliseconds(5_001));
        assert!(token.is_usable(now));
    }

    #[test]
    fn issued_adds_lifetime_in_seconds() {
        let now = Utc::now();
        let token = CachedToken::issued("t", now, 3600);
        assert_eq!(token.expires_at, now + Duration::seconds(3600));
    }

    #[test]
    fn cache_key_display_joins_client_and_scope() {
        assert_eq!(CacheKey::new("client", "token").to_string(), "client:token");
    }

    #[test]
    fn cache_keys_with_colons_do_not_collide() {
        assert_ne!(CacheKey::new("a:b", "c"), CacheKey::new("a", "b:c"));
    }
}
