//! Resource categories and the operations exposed for each.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{Result, SophosError};

/// Top-level resource category selected by the host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Resource {
    Tenant,
    Endpoint,
    Alert,
    Firewall,
    Security,
}

impl Resource {
    /// Operations available under this resource.
    pub fn operations(self) -> impl Iterator<Item = Operation> {
        Operation::iter().filter(move |op| op.resource() == self)
    }
}

/// An operation, named as the host names it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Operation {
    ListTenants,
    TenantDetails,
    ListEndpoints,
    GetEndpoint,
    FindEndpoint,
    IsolateEndpoint,
    UnisolateEndpoint,
    ListAlerts,
    AckAlert,
    ListFwAlerts,
    FwStatus,
    TamperStatus,
    ResetTamper,
}

impl Operation {
    /// Resolve `(resource, operation)` names, rejecting unknown names and
    /// operations that belong to a different resource.
    pub fn resolve(resource: &str, operation: &str) -> Result<(Resource, Self)> {
        let unsupported = || SophosError::UnsupportedOperation {
            resource: resource.to_string(),
            operation: operation.to_string(),
        };
        let parsed_resource: Resource = resource.parse().map_err(|_| unsupported())?;
        let parsed_operation: Self = operation.parse().map_err(|_| unsupported())?;
        if parsed_operation.resource() != parsed_resource {
            return Err(unsupported());
        }
        Ok((parsed_resource, parsed_operation))
    }

    pub fn resource(self) -> Resource {
        match self {
            Self::ListTenants | Self::TenantDetails => Resource::Tenant,
            Self::ListEndpoints
            | Self::GetEndpoint
            | Self::FindEndpoint
            | Self::IsolateEndpoint
            | Self::UnisolateEndpoint => Resource::Endpoint,
            Self::ListAlerts | Self::AckAlert => Resource::Alert,
            Self::ListFwAlerts | Self::FwStatus => Resource::Firewall,
            Self::TamperStatus | Self::ResetTamper => Resource::Security,
        }
    }
}

pub(crate) const TENANTS_PATH: &str = "/tenant/v1/tenants";
pub(crate) const ENDPOINTS_PATH: &str = "/endpoint/v1/endpoints";
pub(crate) const ALERTS_PATH: &str = "/alert/v1/alerts";
pub(crate) const FIREWALL_ALERTS_PATH: &str = "/firewall/v1/alerts";
pub(crate) const FIREWALL_STATUS_PATH: &str = "/firewall/v1/status";
pub(crate) const TAMPER_PATH: &str = "/security/v1/tamper";
pub(crate) const TAMPER_RESET_PATH: &str = "/security/v1/tamper/reset";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_pairs() {
        let (resource, op) = Operation::resolve("endpoint", "findEndpoint").unwrap();
        assert_eq!(resource, Resource::Endpoint);
        assert_eq!(op, Operation::FindEndpoint);
        assert_eq!(
            Operation::resolve("firewall", "listFwAlerts").unwrap().1,
            Operation::ListFwAlerts
        );
    }

    #[test]
    fn rejects_operation_from_other_resource() {
        let err = Operation::resolve("tenant", "listAlerts").unwrap_err();
        match err {
            SophosError::UnsupportedOperation {
                resource,
                operation,
            } => {
                assert_eq!(resource, "tenant");
                assert_eq!(operation, "listAlerts");
            }
            other => panic!("expected UnsupportedOperation, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_resource() {
        assert!(Operation::resolve("mailbox", "listTenants").is_err());
    }

    #[test]
    fn names_round_trip_through_display() {
        assert_eq!(Operation::UnisolateEndpoint.to_string(), "unisolateEndpoint");
        assert_eq!(Operation::AckAlert.to_string(), "ackAlert");
        assert_eq!(Resource::Security.to_string(), "security");
    }

    #[test]
    fn every_resource_has_operations() {
        for resource in Resource::iter() {
            assert!(resource.operations().count() >= 2, "{resource} has too few operations");
        }
        assert_eq!(Resource::Endpoint.operations().count(), 5);
    }
}
