use std::sync::Arc;
use std::time::Duration;

use inmo_store::{Block, NewBlock, PropertyMap, Record, RecordQuery, properties_payload};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use super::{RecordStore, StoreError, StoreResult};

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com";
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
const VERSION_HEADER: &str = "Notion-Version";

/// Connection settings for the hosted store API.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub base_url: String,
    pub token: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl NotionConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the hosted store. Cheap to clone.
#[derive(Clone)]
pub struct NotionStore {
    inner: Arc<NotionInner>,
}

struct NotionInner {
    client: reqwest::Client,
    base_url: String,
    token: String,
    api_version: String,
}

#[derive(Deserialize)]
struct ListResponse<T> {
    results: Vec<T>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl NotionStore {
    /// Builds the HTTP client.
    ///
    /// # Errors
    /// Returns `StoreError::Http` if the client cannot be constructed.
    pub fn new(config: NotionConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(NotionInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: config.token,
                api_version: config.api_version,
            }),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{path}", self.inner.base_url);
        debug!(%method, %url, "store request");
        self.inner
            .client
            .request(method, url)
            .bearer_auth(&self.inner.token)
            .header(VERSION_HEADER, &self.inner.api_version)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        let body: Value = response.json().await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn api_error(status: u16, body: &str) -> StoreError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = parsed.map_or((None, None), |err| (err.code, err.message));
    StoreError::Api {
        status,
        code: code.unwrap_or_else(|| "unknown".to_string()),
        message: message.unwrap_or_else(|| body.trim().to_string()),
    }
}

impl RecordStore for NotionStore {
    async fn query(&self, collection_id: &str, query: &RecordQuery) -> StoreResult<Vec<Record>> {
        let request = self
            .request(Method::POST, &format!("databases/{collection_id}/query"))
            .json(&query.to_payload());
        let response: ListResponse<Record> = self.send(request).await?;
        Ok(response.results)
    }

    async fn create(&self, collection_id: &str, properties: &PropertyMap) -> StoreResult<Record> {
        let body = json!({
            "parent": { "database_id": collection_id },
            "properties": properties_payload(properties),
        });
        let request = self.request(Method::POST, "pages").json(&body);
        self.send(request).await
    }

    async fn update(&self, record_id: &str, properties: &PropertyMap) -> StoreResult<Record> {
        let body = json!({ "properties": properties_payload(properties) });
        let request = self
            .request(Method::PATCH, &format!("pages/{record_id}"))
            .json(&body);
        self.send(request).await
    }

    async fn list_children(&self, node_id: &str, page_size: usize) -> StoreResult<Vec<Block>> {
        let request = self.request(
            Method::GET,
            &format!("blocks/{node_id}/children?page_size={page_size}"),
        );
        let response: ListResponse<Block> = self.send(request).await?;
        Ok(response.results)
    }

    async fn append_children(&self, node_id: &str, children: &[NewBlock]) -> StoreResult<Vec<Block>> {
        let payload: Vec<Value> = children.iter().map(NewBlock::to_payload).collect();
        let request = self
            .request(Method::PATCH, &format!("blocks/{node_id}/children"))
            .json(&json!({ "children": payload }));
        let response: ListResponse<Block> = self.send(request).await?;
        Ok(response.results)
    }

    async fn archive(&self, node_id: &str) -> StoreResult<()> {
        let request = self
            .request(Method::PATCH, &format!("blocks/{node_id}"))
            .json(&json!({ "archived": true }));
        let _: Value = self.send(request).await?;
        Ok(())
    }
}
