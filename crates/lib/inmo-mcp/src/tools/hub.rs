use inmo_core::control::SummaryRequest;
use inmo_core::store::RecordStore;
use inmo_store::schema::SINCE_DAYS_DEFAULT;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{InmoMcp, helpers};

/// Parameters for rebuilding the hub summary.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RebuildHubSummaryParams {
    /// Lookback window in days.
    #[serde(default = "default_since_days")]
    #[schemars(range(min = 1, max = 90))]
    pub since_days: u32,
    /// Logical collection name; defaults to `seguimientos`.
    #[serde(default)]
    pub db: Option<String>,
}

const fn default_since_days() -> u32 {
    SINCE_DAYS_DEFAULT
}

#[tool_router(router = tool_router_hub, vis = "pub")]
impl<S: RecordStore> InmoMcp<S> {
    #[tool(
        name = "rebuild-hub-summary",
        description = "Archive the previous AUTO · Resumen callout on the hub and publish a new one with up to 25 recently edited records. Returns hub-updated:<n>."
    )]
    async fn rebuild_hub_summary(
        &self,
        Parameters(params): Parameters<RebuildHubSummaryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let request = SummaryRequest {
            db: params.db,
            since_days: Some(params.since_days),
        };

        let report = self
            .control
            .rebuild_hub_summary(request)
            .await
            .map_err(helpers::map_control_err)?;
        Ok(CallToolResult::success(vec![Content::text(report.to_string())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inmo_core::control::{HubControlPlane, HubSettings};
    use inmo_core::registry::CollectionRegistry;
    use inmo_core::store::MemoryStore;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn server() -> InmoMcp<MemoryStore> {
        let registry = CollectionRegistry::new([("seguimientos", "db-seg")]).expect("registry");
        InmoMcp::new(HubControlPlane::new(
            MemoryStore::new(),
            HubSettings::new(registry, "hub"),
        ))
    }

    #[tokio::test]
    async fn explicit_empty_db_is_not_defaulted() {
        let server = server();
        let params: RebuildHubSummaryParams =
            serde_json::from_value(json!({ "db": "" })).expect("valid params");

        let err = server
            .rebuild_hub_summary(Parameters(params))
            .await
            .expect_err("empty db is unknown");

        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(err.message, "unknown collection: ");
        assert!(server.control().store().calls().await.is_empty());
    }

    #[test]
    fn defaults_apply_when_fields_are_missing() {
        let params: RebuildHubSummaryParams =
            serde_json::from_value(json!({})).expect("empty object is valid");
        assert_eq!(params.since_days, 14);
        assert_eq!(params.db, None);

        let params: RebuildHubSummaryParams =
            serde_json::from_value(json!({ "sinceDays": 30, "db": "visitas" }))
                .expect("camelCase fields");
        assert_eq!(params.since_days, 30);
        assert_eq!(params.db.as_deref(), Some("visitas"));
    }
}
