//! Sophos Central connector.
//!
//! Exposes tenant, endpoint, alert, firewall, and tamper-protection
//! operations of the Sophos Central REST API. Access tokens come from the
//! OAuth2 client-credentials grant and are cached per client id and scope;
//! list endpoints are walked through their `next` cursors and flattened into
//! one `{ "items": [...] }` record.
//!
//! # Quick Start
//!
//! ```no_run
//! use sophos_central::prelude::*;
//!
//! # async fn example() -> sophos_central::error::Result<()> {
//! let connector = SophosCentral::new(SophosConfig::from_env()?)?;
//! let client = connector.client(Credentials::new("client-id", "client-secret"));
//! let endpoints = client.fetch_all_pages("/endpoint/v1/endpoints", &[]).await?;
//! println!("{}", endpoints.into_value());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod node;
pub mod prelude;

#[cfg(feature = "cli")]
pub mod cli;
