//! Per-item execution: route each work item to its API call and turn
//! failures into `{ error }` records.

use serde_json::{json, Value};

use super::filter::EndpointFilter;
use super::params::WorkItem;
use super::resource::{
    Operation, ALERTS_PATH, ENDPOINTS_PATH, FIREWALL_ALERTS_PATH, FIREWALL_STATUS_PATH,
    TAMPER_PATH, TAMPER_RESET_PATH, TENANTS_PATH,
};
use crate::api::http::build_client;
use crate::api::SophosClient;
use crate::auth::{Credentials, TokenCache, TokenManager};
use crate::config::SophosConfig;
use crate::error::{Result, SophosError};

/// Connector instance: owns the HTTP client and the token cache shared by
/// every item it runs.
///
/// # Example
/// ```no_run
/// use sophos_central::auth::Credentials;
/// use sophos_central::config::SophosConfig;
/// use sophos_central::node::{SophosCentral, WorkItem};
///
/// # async fn example() -> sophos_central::error::Result<()> {
/// let connector = SophosCentral::new(SophosConfig::default())?;
/// let items = vec![WorkItem::builder()
///     .resource("alert")
///     .operation("listAlerts")
///     .build()];
/// let records = connector
///     .execute(&Credentials::new("client-id", "client-secret"), &items)
///     .await;
/// # let _ = records;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SophosCentral {
    config: SophosConfig,
    http: reqwest::Client,
    tokens: TokenManager,
}

impl SophosCentral {
    pub fn new(config: SophosConfig) -> Result<Self> {
        Self::with_cache(config, TokenCache::new())
    }

    /// Build a connector around an existing token cache.
    pub fn with_cache(config: SophosConfig, cache: TokenCache) -> Result<Self> {
        let http = build_client()?;
        let tokens = TokenManager::new(http.clone(), cache)
            .with_token_url(config.token_url.clone())
            .with_timeout(config.token_timeout);
        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    pub fn config(&self) -> &SophosConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// API client acting as `credentials`.
    pub fn client(&self, credentials: Credentials) -> SophosClient {
        SophosClient::new(self.http.clone(), self.tokens.clone(), credentials)
            .with_base_url(self.config.api_base_url.clone())
            .with_timeout(self.config.request_timeout)
            .with_max_pages(self.config.max_pages)
    }

    /// Run every item in order and collect their output records.
    ///
    /// A failing item contributes a single `{ "error": ... }` record and does
    /// not stop the remaining items.
    pub async fn execute(&self, credentials: &Credentials, items: &[WorkItem]) -> Vec<Value> {
        let client = self.client(credentials.clone());
        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            records.extend(execute_item(&client, item).await);
            tracing::debug!(index, "item processed");
        }
        records
    }
}

/// Run one item and return its output records.
pub async fn execute_item(client: &SophosClient, item: &WorkItem) -> Vec<Value> {
    match run_operation(client, item).await {
        Ok(result) => {
            let mut records = vec![result];
            if item.debug {
                records.push(json!({
                    "debug": "operation complete",
                    "resource": item.resource,
                    "operation": item.operation,
                }));
            }
            records
        }
        Err(err) => {
            tracing::warn!(
                resource = %item.resource,
                operation = %item.operation,
                category = ?err.category(),
                error = %err,
                "operation failed"
            );
            vec![json!({ "error": err.item_payload() })]
        }
    }
}

/// Validate the item's parameters and perform its API call(s).
///
/// Parameter and routing errors are raised before any network call.
pub async fn run_operation(client: &SophosClient, item: &WorkItem) -> Result<Value> {
    let (_, operation) = Operation::resolve(&item.resource, &item.operation)?;
    let limit = [("limit", item.limit.to_string())];

    match operation {
        Operation::ListTenants => Ok(client.fetch_all_pages(TENANTS_PATH, &limit).await?.into()),
        Operation::TenantDetails => {
            let tenant_id = required(&item.tenant_id, "tenantId required")?;
            client.get(&format!("{TENANTS_PATH}/{tenant_id}"), &[]).await
        }
        Operation::ListEndpoints => Ok(client.fetch_all_pages(ENDPOINTS_PATH, &limit).await?.into()),
        Operation::GetEndpoint => {
            let endpoint_id = required(&item.endpoint_id, "endpointId required")?;
            client.get(&format!("{ENDPOINTS_PATH}/{endpoint_id}"), &[]).await
        }
        Operation::FindEndpoint => {
            let raw_filter = required(&item.filter, "filter required")?;
            let filter = EndpointFilter::parse(raw_filter)?;
            let listed = client.fetch_all_pages(ENDPOINTS_PATH, &limit).await?;
            let results = filter.apply(listed.items().unwrap_or_default());
            Ok(json!({ "results": results }))
        }
        Operation::IsolateEndpoint | Operation::UnisolateEndpoint => {
            let endpoint_id = required(&item.endpoint_id, "endpointId required")?;
            let action = if operation == Operation::IsolateEndpoint {
                "isolate"
            } else {
                "unisolate"
            };
            client
                .post(&format!("{ENDPOINTS_PATH}/{endpoint_id}/{action}"), None)
                .await
        }
        Operation::ListAlerts => Ok(client.fetch_all_pages(ALERTS_PATH, &limit).await?.into()),
        Operation::AckAlert => {
            let alert_id = required(&item.endpoint_id, "alert id required")?;
            client
                .post(&format!("{ALERTS_PATH}/{alert_id}/acknowledge"), None)
                .await
        }
        Operation::ListFwAlerts => Ok(client
            .fetch_all_pages(FIREWALL_ALERTS_PATH, &limit)
            .await?
            .into()),
        Operation::FwStatus => client.get(FIREWALL_STATUS_PATH, &[]).await,
        Operation::TamperStatus => client.get(TAMPER_PATH, &[]).await,
        Operation::ResetTamper => client.post(TAMPER_RESET_PATH, Some(&json!({}))).await,
    }
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    if value.is_empty() {
        Err(SophosError::missing(message))
    } else {
        Ok(value)
    }
}
