use inmo_core::control::UpsertRequest;
use inmo_core::store::RecordStore;
use inmo_store::{UniqueValue, property_map_from_json};
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{InmoMcp, helpers};

/// Parameters for a find-unique-or-create call.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertParams {
    /// Logical collection name.
    pub db: String,
    /// Field compared against `uniqueValue`.
    pub unique_prop: String,
    /// Number, string or boolean to match.
    pub unique_value: Value,
    /// Field name to value to write on the matched or created record.
    pub properties: Map<String, Value>,
}

#[tool_router(router = tool_router_records, vis = "pub")]
impl<S: RecordStore> InmoMcp<S> {
    #[tool(
        description = "Update the record whose uniqueProp equals uniqueValue, or create it. Returns updated:<id> or created:<id>."
    )]
    async fn upsert(
        &self,
        Parameters(params): Parameters<UpsertParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let unique_value = UniqueValue::infer(&params.unique_value)
            .map_err(|err| helpers::invalid_params(format!("uniqueValue: {err}")))?;
        let properties = property_map_from_json(params.properties)
            .map_err(|err| helpers::invalid_params(err.to_string()))?;

        let outcome = self
            .control
            .upsert(UpsertRequest {
                db: params.db,
                unique_prop: params.unique_prop,
                unique_value,
                properties,
            })
            .await
            .map_err(helpers::map_control_err)?;
        Ok(CallToolResult::success(vec![Content::text(outcome.to_string())]))
    }
}
