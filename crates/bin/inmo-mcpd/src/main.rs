//! Daemon entry point for the inmo MCP server.
//!
//! Loads configuration from CLI flags and the environment, loads the collection
//! registry, and serves the MCP protocol over streamable HTTP and/or stdio.

mod config;
mod registry;

use std::error::Error;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, try_join_all};
use inmo_core::control::{HubControlPlane, HubSettings};
use inmo_core::store::{MemoryStore, NotionStore, RecordStore};
use inmo_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, InmoConfig};
use crate::registry::build_settings;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = InmoConfig::from_args()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = build_settings(&config)?;

    if config.store_in_memory {
        warn!("using the in-memory record store; nothing is persisted");
        run(MemoryStore::new(), settings, &config).await
    } else {
        let notion = config
            .notion_config()
            .ok_or(ConfigError::MissingSetting("INMO_NOTION_TOKEN"))?;
        info!(base_url = %notion.base_url, api_version = %notion.api_version, "using remote record store");
        run(NotionStore::new(notion)?, settings, &config).await
    }
}

async fn run<S: RecordStore>(
    store: S,
    settings: HubSettings,
    config: &InmoConfig,
) -> Result<(), BoxError> {
    let control = HubControlPlane::new(store, settings);
    let mut servers: Vec<LocalBoxFuture<'static, Result<(), BoxError>>> = Vec::new();

    if config.mcp_serve {
        let http = McpHttpServerConfig::new(config.mcp_http_addr);
        servers.push(serve_streamable_http(control.clone(), http).boxed_local());
    }
    if config.enable_stdio {
        servers.push(serve_stdio(control).boxed_local());
    }

    try_join_all(servers).await?;
    Ok(())
}
