use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Scope requested when the caller does not name one.
pub const DEFAULT_SCOPE: &str = "token";

/// Client-credentials triple for the Sophos identity provider.
///
/// # Example
/// ```
/// use sophos_central::auth::Credentials;
///
/// let creds = Credentials::new("client-id", "client-secret");
/// assert_eq!(creds.scope, "token");
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_scope", deserialize_with = "non_blank_scope")]
    pub scope: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Override the OAuth scope. A blank scope falls back to the default.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.scope = if scope.trim().is_empty() {
            DEFAULT_SCOPE.to_string()
        } else {
            scope
        };
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn non_blank_scope<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let scope = Option::<String>::deserialize(deserializer)?;
    Ok(scope
        .filter(|scope| !scope.trim().is_empty())
        .unwrap_or_else(default_scope))
}
