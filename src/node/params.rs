use bon::Builder;
use serde::{Deserialize, Serialize};

/// Page size requested when the host does not set one.
pub const DEFAULT_LIMIT: u32 = 100;

/// Parameters of one input item, as resolved by the workflow host.
///
/// `endpoint_id` doubles as the alert id for `ackAlert`.
///
/// # Example
/// ```
/// use sophos_central::node::WorkItem;
///
/// let item = WorkItem::builder()
///     .resource("endpoint")
///     .operation("getEndpoint")
///     .endpoint_id("ep-1")
///     .build();
/// assert_eq!(item.limit, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    #[builder(into)]
    pub resource: String,
    #[builder(into)]
    pub operation: String,
    #[serde(default)]
    #[builder(default, into)]
    pub tenant_id: String,
    #[serde(default)]
    #[builder(default, into)]
    pub endpoint_id: String,
    #[serde(default)]
    #[builder(default, into)]
    pub filter: String,
    #[serde(default = "default_limit")]
    #[builder(default = DEFAULT_LIMIT)]
    pub limit: u32,
    #[serde(default)]
    #[builder(default)]
    pub debug: bool,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
