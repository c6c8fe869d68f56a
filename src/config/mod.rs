//! Configuration (layered: defaults < TOML file < environment).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::auth::manager::{DEFAULT_TOKEN_TIMEOUT, DEFAULT_TOKEN_URL};
use crate::auth::Credentials;
use crate::error::{Result, SophosError};

/// Connector settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SophosConfig {
    pub api_base_url: String,
    pub token_url: String,
    pub token_timeout: Duration,
    pub request_timeout: Duration,
    /// Optional cap on pages per pagination walk (at least 1); `None` is unbounded.
    pub max_pages: Option<usize>,
    pub credentials: Option<Credentials>,
}

impl Default for SophosConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            token_timeout: DEFAULT_TOKEN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pages: None,
            credentials: None,
        }
    }
}

impl SophosConfig {
    /// Default config file path (~/.sophos-central/config.toml).
    pub fn default_path() -> PathBuf {
        directories::UserDirs::new()
            .map(|dirs| dirs.home_dir().join(".sophos-central"))
            .unwrap_or_else(|| PathBuf::from(".sophos-central"))
            .join("config.toml")
    }

    /// Defaults, overlaid with the default config file, overlaid with env.
    pub fn load() -> Result<Self> {
        Self::load_from_path(Self::default_path())?.with_env()
    }

    /// Defaults overlaid with environment variables (`.env` is honoured).
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Load a TOML config file. A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(SophosError::Io(err)),
        };
        let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
            SophosError::Configuration(format!("invalid config file {}: {e}", path.display()))
        })?;
        Self::default().merge_file(file)
    }

    /// Overlay `SOPHOS_*` environment variables onto this config.
    pub fn with_env(self) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_file(mut self, file: ConfigFile) -> Result<Self> {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(url) = file.token_url {
            self.token_url = url;
        }
        if let Some(secs) = file.token_timeout_secs {
            self.token_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = file.max_pages {
            self.max_pages = Some(page_cap(pages, "max_pages")?);
        }
        if let Some(creds) = file.credentials {
            self.credentials = Some(
                Credentials::new(creds.client_id, creds.client_secret)
                    .with_scope(creds.scope.unwrap_or_default()),
            );
        }
        Ok(self)
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var("SOPHOS_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = var("SOPHOS_TOKEN_URL") {
            self.token_url = url;
        }
        if let Some(secs) = parse_var(&var, "SOPHOS_TOKEN_TIMEOUT_SECS")? {
            self.token_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var(&var, "SOPHOS_REQUEST_TIMEOUT_SECS")? {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = parse_var(&var, "SOPHOS_MAX_PAGES")? {
            self.max_pages = Some(page_cap(pages, "SOPHOS_MAX_PAGES")?);
        }

        let client_id = var("SOPHOS_CLIENT_ID");
        let client_secret = var("SOPHOS_CLIENT_SECRET");
        let scope = var("SOPHOS_SCOPE");
        match (client_id, client_secret) {
            (Some(id), Some(secret)) => {
                self.credentials = Some(
                    Credentials::new(id, secret).with_scope(scope.unwrap_or_default()),
                );
            }
            (None, None) => {
                if let Some(scope) = scope {
                    self.credentials = self.credentials.map(|creds| creds.with_scope(scope));
                }
            }
            _ => {
                return Err(SophosError::Configuration(
                    "SOPHOS_CLIENT_ID and SOPHOS_CLIENT_SECRET must be set together".to_string(),
                ))
            }
        }
        Ok(self)
    }

    /// Credentials, or a configuration error when none were provided.
    pub fn require_credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            SophosError::Configuration(
                "no credentials configured (set SOPHOS_CLIENT_ID and SOPHOS_CLIENT_SECRET)"
                    .to_string(),
            )
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    token_url: Option<String>,
    token_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    max_pages: Option<usize>,
    credentials: Option<CredentialSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CredentialSection {
    client_id: String,
    client_secret: String,
    scope: Option<String>,
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match var(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            SophosError::Configuration(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}

/// A page cap must allow at least the first page.
fn page_cap(pages: usize, key: &str) -> Result<usize> {
    if pages == 0 {
        return Err(SophosError::Configuration(format!(
            "{key} must be at least 1; leave it unset for no limit"
        )));
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEFAULT_SCOPE;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_sophos() {
        let config = SophosConfig::default();
        assert_eq!(config.api_base_url, "https://api.central.sophos.com");
        assert_eq!(config.token_url, "https://id.sophos.com/api/v2/oauth2/token");
        assert_eq!(config.token_timeout, Duration::from_secs(15));
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.max_pages, None);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn env_vars_override_defaults() {
        let config = SophosConfig::default()
            .merge_vars(vars(&[
                ("SOPHOS_API_BASE_URL", "http://localhost:8080"),
                ("SOPHOS_REQUEST_TIMEOUT_SECS", "5"),
                ("SOPHOS_MAX_PAGES", "50"),
                ("SOPHOS_CLIENT_ID", "cid"),
                ("SOPHOS_CLIENT_SECRET", "secret"),
            ]))
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_pages, Some(50));
        let creds = config.require_credentials().unwrap();
        assert_eq!(creds.client_id, "cid");
        assert_eq!(creds.scope, DEFAULT_SCOPE);
    }

    #[test]
    fn malformed_timeout_is_rejected() {
        let err = SophosConfig::default()
            .merge_vars(vars(&[("SOPHOS_TOKEN_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, SophosError::Configuration(ref m) if m.contains("SOPHOS_TOKEN_TIMEOUT_SECS")));
    }

    #[test]
    fn zero_page_cap_is_rejected() {
        let err = SophosConfig::default()
            .merge_vars(vars(&[("SOPHOS_MAX_PAGES", "0")]))
            .unwrap_err();
        assert!(matches!(err, SophosError::Configuration(ref m) if m.contains("SOPHOS_MAX_PAGES")));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_pages = 0\n").unwrap();
        assert!(matches!(
            SophosConfig::load_from_path(&path),
            Err(SophosError::Configuration(ref m)) if m.contains("max_pages")
        ));
    }

    #[test]
    fn half_configured_credentials_are_rejected() {
        let result = SophosConfig::default().merge_vars(vars(&[("SOPHOS_CLIENT_ID", "cid")]));
        assert!(matches!(result, Err(SophosError::Configuration(_))));
    }

    #[test]
    fn scope_env_applies_to_file_credentials() {
        let mut config = SophosConfig::default();
        config.credentials = Some(Credentials::new("file-id", "file-secret"));
        let config = config
            .merge_vars(vars(&[("SOPHOS_SCOPE", "central")]))
            .unwrap();
        assert_eq!(config.credentials.unwrap().scope, "central");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SophosConfig::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, SophosConfig::default());
    }

    #[test]
    fn file_values_are_applied() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
api_base_url = "https://api-eu01.central.sophos.com"
request_timeout_secs = 30
max_pages = 10

[credentials]
client_id = "file-id"
client_secret = "file-secret"
scope = "token"
"#,
        )
        .unwrap();
        let config = SophosConfig::load_from_path(&path).unwrap();
        assert_eq!(config.api_base_url, "https://api-eu01.central.sophos.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.token_timeout, Duration::from_secs(15));
        assert_eq!(config.max_pages, Some(10));
        assert_eq!(config.credentials.unwrap().client_id, "file-id");
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_base = \"x\"\n").unwrap();
        assert!(matches!(
            SophosConfig::load_from_path(&path),
            Err(SophosError::Configuration(_))
        ));
    }

    #[test]
    fn require_credentials_errors_when_absent() {
        assert!(SophosConfig::default().require_credentials().is_err());
    }
}
