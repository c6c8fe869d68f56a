//! Workflow-facing operations: resource routing, parameters, and per-item
//! execution with isolated failures.

pub mod executor;
pub mod filter;
pub mod params;
pub mod resource;

pub use executor::{execute_item, run_operation, SophosCentral};
pub use filter::EndpointFilter;
pub use params::{WorkItem, DEFAULT_LIMIT};
pub use resource::{Operation, Resource};
