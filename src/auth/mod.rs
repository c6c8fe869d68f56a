//! OAuth2 client-credentials tokens and the in-memory token cache.

pub mod cache;
pub mod credentials;
pub mod manager;
pub mod token;

pub use cache::TokenCache;
pub use credentials::{Credentials, DEFAULT_SCOPE};
pub use manager::TokenManager;
pub use token::{CacheKey, CachedToken, EXPIRY_SAFETY_MARGIN_MS};
