use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use super::token::{CacheKey, CachedToken};

/// In-memory access-token cache shared by everything built from one connector.
///
/// Clones share the same underlying map. Entries are overwritten in place on
/// refresh and never removed; concurrent refreshes for one key resolve as
/// last write wins, which is harmless because any unexpired token for the key
/// is interchangeable.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<CacheKey, CachedToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `key` if it is still usable at `now`.
    pub fn usable(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CachedToken> {
        let guard = self.entries.read().ok()?;
        guard.get(key).filter(|token| token.is_usable(now)).cloned()
    }

    /// Return the raw entry for `key`, usable or not.
    pub fn get(&self, key: &CacheKey) -> Option<CachedToken> {
        self.entries.read().ok()?.get(key).cloned()
    }

    /// Store `token` under `key`, replacing any previous entry.
    pub fn store(&self, key: CacheKey, token: CachedToken) {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(key, token);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh(token: &str) -> CachedToken {
        CachedToken::new(token, Utc::now() + Duration::hours(1))
    }

    #[test]
    fn store_then_lookup_returns_token() {
        let cache = TokenCache::new();
        let key = CacheKey::new("client", "token");
        cache.store(key.clone(), fresh("abc"));
        let hit = cache.usable(&key, Utc::now()).unwrap();
        assert_eq!(hit.access_token, "abc");
    }

    #[test]
    fn expired_entry_is_not_usable_but_still_present() {
        let cache = TokenCache::new();
        let key = CacheKey::new("client", "token");
        cache.store(
            key.clone(),
            CachedToken::new("old", Utc::now() + Duration::seconds(2)),
        );
        assert!(cache.usable(&key, Utc::now()).is_none());
        assert_eq!(cache.get(&key).unwrap().access_token, "old");
    }

    #[test]
    fn store_overwrites_previous_entry() {
        let cache = TokenCache::new();
        let key = CacheKey::new("client", "token");
        cache.store(key.clone(), fresh("first"));
        cache.store(key.clone(), fresh("second"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().access_token, "second");
    }

    #[test]
    fn scopes_and_clients_are_isolated() {
        let cache = TokenCache::new();
        cache.store(CacheKey::new("a", "x"), fresh("ax"));
        let now = Utc::now();
        assert!(cache.usable(&CacheKey::new("a", "y"), now).is_none());
        assert!(cache.usable(&CacheKey::new("b", "x"), now).is_none());
    }

    #[test]
    fn clones_share_entries() {
        let cache = TokenCache::new();
        let other = cache.clone();
        other.store(CacheKey::new("a", "x"), fresh("shared"));
        assert!(!cache.is_empty());
    }
}
