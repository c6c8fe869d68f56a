//! Convenience re-exports for common use.

pub use crate::api::{PagedResult, SophosClient};
pub use crate::auth::{Credentials, TokenCache, TokenManager};
pub use crate::config::SophosConfig;
pub use crate::error::{Result, SophosError};
pub use crate::node::{Operation, Resource, SophosCentral, WorkItem};
