//! MCP server implementation for inmo-mcp.
//!
//! This crate wires the hub control plane into rmcp tool handlers and exposes
//! the stdio and streamable HTTP runners.

mod helpers;
mod tools;
pub mod server;

use inmo_core::control::HubControlPlane;
use inmo_core::store::RecordStore;
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::tool::ToolRouter,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};

pub use tools::hub::RebuildHubSummaryParams;
pub use tools::records::UpsertParams;

const SERVER_INSTRUCTIONS: &str = r#"inmo-mcp keeps real-estate tracking collections and their hub page up to date.

Tools:
- `upsert`: find the record of collection `db` whose `uniqueProp` equals `uniqueValue` and write
  `properties` onto it, or create it when none matches. Returns `updated:<id>` or `created:<id>`.
  Numbers match number fields, `x@y` strings match email fields, other strings match text fields.
  Plain values in `properties` are written as number, text or checkbox; pass a native
  property object (e.g. `{ "email": "..." }` or `{ "title": [...] }`) for anything else.
- `rebuild-hub-summary`: archive the previous `AUTO · Resumen` callout on the hub and publish a new
  one listing up to 25 records of `db` (default `seguimientos`) edited in the last `sinceDays`
  days (1-90, default 14). Returns `hub-updated:<n>`.
- `list_collections`: configured `db` names.
- `health` returns `ok`.

Notes:
- Calls are not atomic. A failed call may leave partial changes; re-invoke to converge.
- Concurrent upserts of the same value can create duplicates unless the server serializes writes."#;

/// MCP server wrapper around the hub control plane and tool routers.
#[derive(Clone)]
pub struct InmoMcp<S: RecordStore> {
    tool_router: ToolRouter<Self>,
    control: HubControlPlane<S>,
}

impl<S: RecordStore> InmoMcp<S> {
    /// Creates a handler over a shared control plane. Cheap; one per session.
    #[must_use]
    pub fn new(control: HubControlPlane<S>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_records()
            + Self::tool_router_hub();
        Self {
            tool_router,
            control,
        }
    }

    pub const fn control(&self) -> &HubControlPlane<S> {
        &self.control
    }

    /// Names of every registered tool, sorted.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        names
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl<S: RecordStore> InmoMcp<S> {
    #[tool(description = "Health check. Returns 'ok'.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::success(vec![Content::text("ok")]))
    }

    #[tool(description = "List the configured collection names accepted as `db`.")]
    async fn list_collections(&self) -> Result<CallToolResult, ErrorData> {
        let names = self.control.collection_names();
        Ok(CallToolResult::success(vec![Content::json(names)?]))
    }
}

#[tool_handler]
impl<S: RecordStore> ServerHandler for InmoMcp<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
