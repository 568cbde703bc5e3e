//! HTTP record store against a fake store served by axum

use agrix_common::config::StoreConfig;
use agrix_common::events::EventBus;
use agrix_insight::model::RecordId;
use agrix_insight::orchestrator::{FetchOrchestrator, FetchOutcome, FetchRequest, FetchSettings};
use agrix_insight::store::{HttpRecordStore, ListParams, RecordStore, StoreError};
use agrix_insight::RecordKind;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

fn farmer_rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Maria Santos", "barangay": "Poblacion", "crops": [], "rice": []}),
        json!({"id": "2", "name": "Pedro Reyes", "barangay": "San Roque", "crops": [], "rice": []}),
        json!({"id": 3, "name": "Ana Cruz", "barangay": "Poblacion"}),
    ]
}

fn page_of(rows: Vec<Value>, query: &HashMap<String, String>) -> Vec<Value> {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(rows.len());
    rows.into_iter().skip((page - 1) * limit).take(limit).collect()
}

async fn list_farmers(State(seen): State<Seen>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let rows = page_of(farmer_rows(), &query);
    seen.lock().unwrap().push(query);
    Json(Value::Array(rows))
}

async fn get_farmer(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "3" => (
            StatusCode::OK,
            Json(json!({"data": {
                "id": 3,
                "name": "Ana Cruz",
                "crops": [{"crop_type": "Banana", "crop_value": "Saba", "quantity": 40}],
                "rice": []
            }})),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Farmer not found"}))).into_response(),
    }
}

async fn list_livestock(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let rows = vec![
        json!({"id": 1, "farmer_id": 1, "animal_type": "Goat", "quantity": "4"}),
        json!({"id": 2, "farmer_id": 42, "animal_type": "Chicken", "quantity": 25}),
        json!("not a row"),
    ];
    Json(json!({"data": page_of(rows, &query), "total": 3}))
}

async fn list_operators() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "database offline")
}

async fn broken() -> impl IntoResponse {
    (StatusCode::OK, "<html>maintenance</html>")
}

async fn wrong_shape() -> Json<Value> {
    Json(json!({"message": "ok"}))
}

/// Serve the fake store on an ephemeral port; returns its `/api` base URL
async fn spawn_store(seen: Seen) -> String {
    let app = Router::new()
        .route("/api/farmers", get(list_farmers))
        .route("/api/farmers/:id", get(get_farmer))
        .route("/api/livestock", get(list_livestock))
        .route("/api/operators", get(list_operators))
        .route("/broken/farmers", get(broken))
        .route("/broken/livestock", get(wrong_shape))
        .with_state(seen);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api/")
}

fn client(base_url: &str) -> HttpRecordStore {
    HttpRecordStore::new(&StoreConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_lists_bare_array_with_paging_params() {
    let seen = Seen::default();
    let store = client(&spawn_store(Arc::clone(&seen)).await);

    let page = store
        .list_farmers(&ListParams::first(2, Some("  santos ".to_string())))
        .await
        .unwrap();

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[1].id, Some(RecordId::from(2)));
    assert!(page.is_full(2));

    let query = seen.lock().unwrap()[0].clone();
    assert_eq!(query.get("page").map(String::as_str), Some("1"));
    assert_eq!(query.get("limit").map(String::as_str), Some("2"));
    assert_eq!(query.get("search").map(String::as_str), Some("santos"));
}

#[tokio::test]
async fn test_blank_search_not_sent() {
    let seen = Seen::default();
    let store = client(&spawn_store(Arc::clone(&seen)).await);

    store
        .list_farmers(&ListParams::first(10, Some("   ".to_string())))
        .await
        .unwrap();

    assert!(!seen.lock().unwrap()[0].contains_key("search"));
}

#[tokio::test]
async fn test_wrapped_list_drops_undecodable_rows() {
    let store = client(&spawn_store(Seen::default()).await);

    let page = store.list_livestock(&ListParams::first(3, None)).await.unwrap();

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.received, 3);
    assert!(page.is_full(3));
    assert_eq!(page.rows[0].animal_type.as_deref(), Some("Goat"));
}

#[tokio::test]
async fn test_farmer_detail_and_not_found() {
    let store = client(&spawn_store(Seen::default()).await);

    let detail = store.get_farmer(&RecordId::from(3)).await.unwrap();
    assert_eq!(detail.crops.map(|c| c.len()), Some(1));

    let missing = store.get_farmer(&RecordId::from(9)).await.unwrap_err();
    assert!(matches!(missing, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let store = client(&spawn_store(Seen::default()).await);

    let err = store.list_operators(&ListParams::first(10, None)).await.unwrap_err();
    assert_eq!(err, StoreError::Api(500, "database offline".to_string()));
}

#[tokio::test]
async fn test_malformed_bodies_map_to_parse_error() {
    let base = spawn_store(Seen::default()).await;
    let store = client(&base.replace("/api/", "/broken"));

    let not_json = store.list_farmers(&ListParams::first(10, None)).await.unwrap_err();
    assert!(matches!(not_json, StoreError::Parse(_)));

    let wrong_shape = store.list_livestock(&ListParams::first(10, None)).await.unwrap_err();
    assert!(matches!(wrong_shape, StoreError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_store_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = client(&format!("http://{addr}/api"));
    let err = store.list_farmers(&ListParams::first(10, None)).await.unwrap_err();
    assert!(matches!(err, StoreError::Network(_)));
}

#[tokio::test]
async fn test_orchestrated_fetch_over_http() {
    let seen = Seen::default();
    let base = spawn_store(Arc::clone(&seen)).await;
    let settings = FetchSettings {
        page_size: 2,
        max_pages: 10,
        hydrate_nested: true,
        hydrate_concurrency: 2,
        cache_max_age: Duration::from_secs(60),
    };
    let orch = FetchOrchestrator::new(Arc::new(client(&base)), settings, EventBus::new(16));

    let outcome = orch.load("inventory", FetchRequest::new(RecordKind::Livestock)).await;
    let FetchOutcome::Loaded { snapshot, .. } = outcome else {
        panic!("expected livestock to load");
    };
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.records[0].farmer_name().as_deref(), Some("Maria Santos"));
    assert_eq!(snapshot.records[1].farmer_name().as_deref(), Some("Unknown"));

    // Farmer 3 omits its nested rows and is hydrated from the detail endpoint
    let crops = orch.load("inventory", FetchRequest::new(RecordKind::Crop)).await;
    let crops = crops.snapshot().unwrap();
    assert_eq!(crops.len(), 1);
    assert_eq!(crops.records[0].barangay(), Some("Poblacion"));

    let operators = orch.load("inventory", FetchRequest::new(RecordKind::Operator)).await;
    assert!(matches!(operators, FetchOutcome::Failed { retained: None, .. }));
}
