//! Shared test helpers: a connector wired to a wiremock server.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use sophos_central::auth::Credentials;
use sophos_central::config::SophosConfig;
use sophos_central::node::SophosCentral;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/api/v2/oauth2/token";

/// Config pointing both the identity provider and the API at `server`.
pub fn config_for(server: &MockServer) -> SophosConfig {
    SophosConfig {
        api_base_url: server.uri(),
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
        token_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(5),
        ..SophosConfig::default()
    }
}

pub fn connector(server: &MockServer) -> SophosCentral {
    SophosCentral::new(config_for(server)).expect("connector")
}

pub fn credentials() -> Credentials {
    Credentials::new("client-a", "secret-a")
}

/// Serve `token` from the token endpoint, expecting `calls` exchanges.
pub async fn mount_token(server: &MockServer, token: &str, calls: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(calls)
        .mount(server)
        .await;
}
