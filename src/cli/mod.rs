//! CLI entry point for the Sophos Central connector.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::SophosConfig;
use crate::error::{Result, SophosError};
use crate::node::{SophosCentral, WorkItem, DEFAULT_LIMIT};

/// Sophos Central connector CLI
#[derive(Parser, Debug)]
#[command(name = "sophos-central", version, about = "Run Sophos Central operations")]
pub struct Cli {
    /// Path to a TOML configuration file (defaults to ~/.sophos-central/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single operation
    Call(CallArgs),
    /// Run a JSON array of work items
    Run(RunArgs),
}

/// Arguments for `sophos-central call`.
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Resource category (tenant, endpoint, alert, firewall, security)
    pub resource: String,

    /// Operation name (e.g. listEndpoints, isolateEndpoint)
    pub operation: String,

    #[arg(long, default_value = "")]
    pub tenant_id: String,

    /// Endpoint id (also used as the alert id for ackAlert)
    #[arg(long, default_value = "")]
    pub endpoint_id: String,

    /// JSON object of field/substring pairs for findEndpoint
    #[arg(long, default_value = "")]
    pub filter: String,

    /// Page size for list operations
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,

    /// Append a diagnostic record after the result
    #[arg(long)]
    pub debug: bool,
}

impl From<CallArgs> for WorkItem {
    fn from(args: CallArgs) -> Self {
        WorkItem {
            resource: args.resource,
            operation: args.operation,
            tenant_id: args.tenant_id,
            endpoint_id: args.endpoint_id,
            filter: args.filter,
            limit: args.limit,
            debug: args.debug,
        }
    }
}

/// Arguments for `sophos-central run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// File holding the work items; reads stdin when omitted or `-`
    pub items: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Resolve configuration for a CLI invocation.
pub fn load_config(path: Option<&PathBuf>) -> Result<SophosConfig> {
    match path {
        Some(path) => SophosConfig::load_from_path(path)?.with_env(),
        None => SophosConfig::load(),
    }
}

/// Execute a parsed command and return the output records.
pub async fn handle(cli: Cli) -> Result<Vec<Value>> {
    let config = load_config(cli.config.as_ref())?;
    let credentials = config.require_credentials()?.clone();
    let items = match cli.command {
        Commands::Call(args) => vec![WorkItem::from(args)],
        Commands::Run(args) => read_items(args.items.as_ref())?,
    };
    tracing::info!(items = items.len(), "running work items");
    let connector = SophosCentral::new(config)?;
    Ok(connector.execute(&credentials, &items).await)
}

fn read_items(path: Option<&PathBuf>) -> Result<Vec<WorkItem>> {
    let raw = match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    parse_items(&raw)
}

/// Parse work items from a JSON array (a single object is also accepted).
pub fn parse_items(raw: &str) -> Result<Vec<WorkItem>> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        _ => Err(SophosError::Configuration(
            "work items must be a JSON array or object".to_string(),
        )),
    }
}
