//! Sophos Central API access: the single-request client and pagination.

pub mod client;
pub mod http;
pub mod pagination;

pub use client::{SophosClient, DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
pub use pagination::{cursor_path, Page, PagedResult};
