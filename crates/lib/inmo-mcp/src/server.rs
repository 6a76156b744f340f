//! MCP server runners for inmo-mcp.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use inmo_core::control::HubControlPlane;
use inmo_core::store::RecordStore;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use serde::Serialize;
use tracing::info;

use crate::InmoMcp;

const MCP_PATH: &str = "/mcp";

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }
}

/// Descriptor served at `/info`.
#[derive(Debug, Clone, Serialize)]
struct ServerDescriptor {
    name: &'static str,
    version: &'static str,
    endpoint: &'static str,
    tools: Vec<String>,
    collections: Vec<String>,
}

/// Serves the MCP server over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio<S: RecordStore>(
    control: HubControlPlane<S>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = InmoMcp::new(control);
    let (stdin, stdout) = stdio();
    info!("inmo-mcp serving over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let _ = running.waiting().await?;
    Ok(())
}

/// Builds the HTTP router: `/mcp` sessions plus `/health` and `/info`.
///
/// Each MCP session gets its own handler built from the shared control plane.
pub fn router<S: RecordStore>(control: HubControlPlane<S>, config: &McpHttpServerConfig) -> Router {
    let descriptor = ServerDescriptor {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoint: MCP_PATH,
        tools: InmoMcp::new(control.clone()).tool_names(),
        collections: control.collection_names(),
    };
    let descriptor = Arc::new(descriptor);

    let service: StreamableHttpService<InmoMcp<S>, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(InmoMcp::new(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/info",
            get(move || {
                let descriptor = descriptor.clone();
                async move { Json(descriptor.as_ref().clone()) }
            }),
        )
        .nest_service(MCP_PATH, service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http<S: RecordStore>(
    control: HubControlPlane<S>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(control, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("inmo-mcp listening on {}{MCP_PATH}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use inmo_core::control::HubSettings;
    use inmo_core::registry::CollectionRegistry;
    use inmo_core::store::MemoryStore;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let registry = CollectionRegistry::new([("seguimientos", "db-seg"), ("propiedades", "db-prop")])
            .expect("registry");
        let control = HubControlPlane::new(MemoryStore::new(), HubSettings::new(registry, "hub"));
        router(control, &McpHttpServerConfig::new(([127, 0, 0, 1], 0).into()))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn info_describes_tools_and_collections() {
        let response = test_router()
            .oneshot(Request::builder().uri("/info").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 64 * 1024).await.expect("body");
        let descriptor: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(descriptor["name"], "inmo-mcp");
        assert_eq!(descriptor["endpoint"], "/mcp");
        assert_eq!(
            descriptor["tools"],
            serde_json::json!(["health", "list_collections", "rebuild-hub-summary", "upsert"])
        );
        assert_eq!(descriptor["collections"], serde_json::json!(["propiedades", "seguimientos"]));
    }
}
