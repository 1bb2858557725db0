//! Integration tests for the record API client
//!
//! A small axum server stands in for the hosted record API so the client's
//! envelope handling can be checked end to end over HTTP.

use std::time::Duration;

use axum::{
    Json, Router,
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    error::StoreError,
    records::{Condition, FetchQuery, RecordClient, RecordClientConfig},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Row {
    #[serde(rename = "Id", default)]
    id: i64,
    name: String,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("X-Project-Id").and_then(|v| v.to_str().ok()) == Some("proj")
        && headers.get("X-Public-Key").and_then(|v| v.to_str().ok()) == Some("pk")
}

async fn query(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"success": false}))).into_response();
    }
    let filtered = body["where"][0]["values"][0].as_i64();
    let rows: Vec<Value> = [json!({"Id": 1, "name": "Landscapes"}), json!({"Id": 2, "name": "Portraits"})]
        .into_iter()
        .filter(|row| filtered.is_none_or(|id| row["Id"].as_i64() == Some(id)))
        .collect();
    Json(json!({"success": true, "data": rows})).into_response()
}

async fn get_one(Path((_, _, id)): Path<(String, String, i64)>) -> impl IntoResponse {
    if id == 1 {
        Json(json!({"success": true, "data": {"Id": 1, "name": "Landscapes"}})).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"success": false}))).into_response()
    }
}

async fn create(Json(body): Json<Value>) -> impl IntoResponse {
    let results: Vec<Value> = body["records"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| {
            if record["name"] == "" {
                json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": [{"fieldLabel": "name", "message": "is required"}]
                })
            } else {
                record["Id"] = json!(10 + i as i64);
                json!({"success": true, "data": record})
            }
        })
        .collect();
    Json(json!({"success": true, "results": results}))
}

async fn delete(Json(body): Json<Value>) -> impl IntoResponse {
    let ids = body["recordIds"].as_array().cloned().unwrap_or_default();
    let results: Vec<Value> = ids.iter().map(|_| json!({"success": true})).collect();
    Json(json!({"success": true, "results": results}))
}

async fn start_mock_api() -> String {
    let app = Router::new()
        .route("/projects/:project/tables/:table/records/query", post(query))
        .route("/projects/:project/tables/:table/records/:id", get(get_one))
        .route(
            "/projects/:project/tables/:table/records",
            post(create).patch(create).delete(delete),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: String, public_key: &str) -> RecordClient {
    RecordClient::new(RecordClientConfig {
        base_url,
        project_id: "proj".to_string(),
        public_key: public_key.to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[tokio::test]
async fn test_fetch_records_with_filter() {
    let client = client(start_mock_api().await, "pk");

    let all: Vec<Row> = client
        .fetch_records("collection", &FetchQuery::fields(&["Id", "name"]))
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let one: Vec<Row> = client
        .fetch_records(
            "collection",
            &FetchQuery::fields(&["Id", "name"]).filter(Condition::equal_to("Id", 2)),
        )
        .await
        .unwrap();
    assert_eq!(one, vec![Row { id: 2, name: "Portraits".to_string() }]);
}

#[tokio::test]
async fn test_get_record_by_id_maps_404_to_none() {
    let client = client(start_mock_api().await, "pk");

    let found: Option<Row> = client.get_record_by_id("collection", 1).await.unwrap();
    assert_eq!(found.map(|r| r.name), Some("Landscapes".to_string()));

    let missing: Option<Row> = client.get_record_by_id("collection", 99).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_create_records_returns_stored_rows() {
    let client = client(start_mock_api().await, "pk");

    let created: Vec<Row> = client
        .create_records(
            "collection",
            &[json!({"name": "Sketches"}), json!({"name": "Studies"})],
        )
        .await
        .unwrap();
    assert_eq!(created[0].id, 10);
    assert_eq!(created[1].name, "Studies");
}

#[tokio::test]
async fn test_per_record_failure_is_rejected_with_field_detail() {
    let client = client(start_mock_api().await, "pk");

    let err = client
        .create_records::<_, Row>("collection", &[json!({"name": ""})])
        .await
        .unwrap_err();
    match err {
        StoreError::Rejected { message, fields } => {
            assert_eq!(message, "Validation failed");
            assert_eq!(fields[0].field_label, "name");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_records() {
    let client = client(start_mock_api().await, "pk");
    let result = client.delete_records("collection", &[1, 2]).await;
    assert!(result.is_ok(), "expected Ok, got {result:?}");
}

#[tokio::test]
async fn test_bad_credentials_surface_as_status_error() {
    let client = client(start_mock_api().await, "wrong");

    let err = client
        .fetch_records::<Row>("collection", &FetchQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 401, .. }));
}

#[tokio::test]
async fn test_unreachable_api_is_transport_error() {
    // Nothing listens on the discard port
    let client = client("http://127.0.0.1:9".to_string(), "pk");
    let err = client
        .fetch_records::<Row>("collection", &FetchQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));
}
