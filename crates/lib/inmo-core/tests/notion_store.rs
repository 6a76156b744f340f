use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Json;
use inmo_core::control::{ControlError, HubControlPlane, HubSettings, SummaryRequest, UpsertRequest};
use inmo_core::registry::CollectionRegistry;
use inmo_core::store::{NotionConfig, NotionStore, RecordStore, StoreError};
use inmo_store::{RecordFilter, RecordQuery, UniqueValue, property_map_from_json};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
struct Captured {
    method: String,
    path: String,
    query: Option<String>,
    auth: Option<String>,
    version: Option<String>,
    body: Value,
}

#[derive(Clone, Default)]
struct FakeNotion {
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl FakeNotion {
    fn requests(&self) -> Vec<Captured> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn routes(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .map(|request| (request.method, request.path))
            .collect()
    }
}

fn page(id: &str, name: &str) -> Value {
    json!({
        "object": "page",
        "id": id,
        "archived": false,
        "last_edited_time": "2026-10-15T09:00:00.000Z",
        "properties": {
            "Name": { "id": "title", "type": "title", "title": [{ "type": "text", "plain_text": name }] }
        }
    })
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn fake_api(
    State(state): State<FakeNotion>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().expect("requests lock").push(Captured {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        auth: header(&headers, "authorization"),
        version: header(&headers, "notion-version"),
        body: body.clone(),
    });

    if path.contains("missing") {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find database with ID: missing."
            })),
        );
    }

    let response = match method.as_str() {
        "POST" if path.ends_with("/query") => json!({
            "object": "list",
            "results": [page("rec-1", "Piso Centro")],
            "has_more": false
        }),
        "POST" => page("rec-new", "Nuevo"),
        "PATCH" if path.starts_with("/v1/pages/") => {
            page(path.trim_start_matches("/v1/pages/"), "Piso Centro")
        }
        "GET" => json!({
            "object": "list",
            "results": [
                {
                    "object": "block",
                    "id": "old-summary",
                    "type": "callout",
                    "archived": false,
                    "callout": { "rich_text": [{ "plain_text": "AUTO · Resumen (últimos 14 días)" }] }
                },
                {
                    "object": "block",
                    "id": "manual",
                    "type": "paragraph",
                    "archived": false,
                    "paragraph": { "rich_text": [{ "plain_text": "Notas" }] }
                }
            ]
        }),
        "PATCH" if path.ends_with("/children") => {
            let parent = path
                .trim_start_matches("/v1/blocks/")
                .trim_end_matches("/children");
            let children = body["children"].as_array().cloned().unwrap_or_default();
            let results: Vec<Value> = children
                .into_iter()
                .enumerate()
                .map(|(index, mut child)| {
                    child["id"] = json!(format!("{parent}-child-{index}"));
                    child
                })
                .collect();
            json!({ "object": "list", "results": results })
        }
        _ => json!({ "object": "block", "id": "archived", "type": "callout", "archived": true }),
    };
    (StatusCode::OK, Json(response))
}

async fn start_fake() -> (SocketAddr, FakeNotion) {
    let state = FakeNotion::default();
    let app = Router::new().fallback(fake_api).with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake store");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

fn build_store(addr: SocketAddr) -> NotionStore {
    NotionStore::new(NotionConfig::new("secret-token").with_base_url(format!("http://{addr}")))
        .expect("client builds")
}

fn build_control_plane(store: NotionStore) -> HubControlPlane<NotionStore> {
    let registry = CollectionRegistry::new([
        ("seguimientos", "db-seg"),
        ("perdidos", "db-missing"),
    ])
    .expect("valid registry");
    HubControlPlane::new(store, HubSettings::new(registry, "hub"))
}

#[tokio::test]
async fn query_sends_filter_and_auth_headers() {
    let (addr, fake) = start_fake().await;
    let store = build_store(addr);

    let query = RecordQuery::new()
        .with_filter(RecordFilter::unique("Email", UniqueValue::from_text("ana@inmo.es")));
    let records = store.query("db-seg", &query).await.expect("query succeeds");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title_text().as_deref(), Some("Piso Centro"));

    let requests = fake.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1/databases/db-seg/query");
    assert_eq!(request.auth.as_deref(), Some("Bearer secret-token"));
    assert_eq!(request.version.as_deref(), Some("2022-06-28"));
    assert_eq!(
        request.body,
        json!({ "filter": { "property": "Email", "email": { "equals": "ana@inmo.es" } } })
    );
}

#[tokio::test]
async fn upsert_updates_first_match_over_http() {
    let (addr, fake) = start_fake().await;
    let control = build_control_plane(build_store(addr));
    let properties = property_map_from_json(vec![("Estado".to_string(), json!("Visitado"))])
        .expect("text field");

    let outcome = control
        .upsert(UpsertRequest {
            db: "seguimientos".to_string(),
            unique_prop: "Name".to_string(),
            unique_value: UniqueValue::from_text("Piso Centro"),
            properties,
        })
        .await
        .expect("upsert succeeds");

    assert_eq!(outcome.to_string(), "updated:rec-1");
    let requests = fake.requests();
    assert_eq!(
        fake.routes(),
        [
            ("POST".to_string(), "/v1/databases/db-seg/query".to_string()),
            ("PATCH".to_string(), "/v1/pages/rec-1".to_string()),
        ]
    );
    assert_eq!(
        requests[1].body["properties"]["Estado"]["rich_text"][0]["text"]["content"],
        "Visitado"
    );
}

#[tokio::test]
async fn summary_rebuild_issues_calls_in_order() {
    let (addr, fake) = start_fake().await;
    let control = build_control_plane(build_store(addr));

    let report = control
        .rebuild_hub_summary(SummaryRequest::new())
        .await
        .expect("rebuild succeeds");

    assert_eq!(report.to_string(), "hub-updated:1");
    assert_eq!(report.archived_count, 1);
    assert_eq!(report.callout_id, "hub-child-0");
    assert_eq!(
        fake.routes(),
        [
            ("POST".to_string(), "/v1/databases/db-seg/query".to_string()),
            ("GET".to_string(), "/v1/blocks/hub/children".to_string()),
            ("PATCH".to_string(), "/v1/blocks/old-summary".to_string()),
            ("PATCH".to_string(), "/v1/blocks/hub/children".to_string()),
            ("PATCH".to_string(), "/v1/blocks/hub-child-0/children".to_string()),
        ]
    );

    let requests = fake.requests();
    assert_eq!(requests[0].body["sorts"][0]["direction"], "descending");
    assert_eq!(requests[0].body["page_size"], 25);
    assert_eq!(requests[1].query.as_deref(), Some("page_size=100"));
    assert_eq!(requests[2].body, json!({ "archived": true }));
    assert_eq!(
        requests[3].body["children"][0]["callout"]["rich_text"][0]["text"]["content"],
        "AUTO · Resumen (últimos 14 días)"
    );
    assert_eq!(
        requests[4].body["children"][0]["bulleted_list_item"]["rich_text"][0]["text"]["content"],
        "Piso Centro"
    );
}

#[tokio::test]
async fn store_errors_propagate_unchanged() {
    let (addr, fake) = start_fake().await;
    let control = build_control_plane(build_store(addr));

    let err = control
        .rebuild_hub_summary(SummaryRequest::new().with_db("perdidos"))
        .await
        .expect_err("missing database");

    assert!(matches!(
        err,
        ControlError::Store(StoreError::Api { status: 404, ref code, .. }) if code == "object_not_found"
    ));
    assert_eq!(fake.requests().len(), 1);
}
