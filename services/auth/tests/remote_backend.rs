//! User store over a mock record API

use std::sync::{Arc, Mutex};
use std::time::Duration;

use auth::{
    accounts::UserService,
    error::AuthError,
    models::{LoginCredentials, Profile, RegisterRequest},
    password::hash_password,
    repositories::{RemoteUserBackend, UserBackend},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use common::{
    jwt::{JwtConfig, JwtService},
    records::{RecordClient, RecordClientConfig},
};
use serde_json::{Value, json};

type Rows = Arc<Mutex<Vec<Value>>>;

async fn query(State(rows): State<Rows>, Json(body): Json<Value>) -> Json<Value> {
    let rows = rows.lock().unwrap();
    let matching: Vec<Value> = rows
        .iter()
        .filter(|row| {
            body["where"].as_array().is_none_or(|conditions| {
                conditions
                    .iter()
                    .all(|c| c["values"][0] == row[c["fieldName"].as_str().unwrap_or_default()])
            })
        })
        .cloned()
        .collect();
    Json(json!({"success": true, "data": matching}))
}

async fn get_one(State(rows): State<Rows>, Path(id): Path<i64>) -> impl IntoResponse {
    let rows = rows.lock().unwrap();
    match rows.iter().find(|r| r["Id"] == id) {
        Some(row) => Json(json!({"success": true, "data": row})).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"success": false}))).into_response(),
    }
}

async fn create(State(rows): State<Rows>, Json(body): Json<Value>) -> Json<Value> {
    let mut rows = rows.lock().unwrap();
    let mut results = Vec::new();
    for mut record in body["records"].as_array().cloned().unwrap_or_default() {
        let next = rows.iter().filter_map(|r| r["Id"].as_i64()).max().unwrap_or(0) + 1;
        record["Id"] = json!(next);
        rows.push(record.clone());
        results.push(json!({"success": true, "data": record}));
    }
    Json(json!({"success": true, "results": results}))
}

async fn update(State(rows): State<Rows>, Json(body): Json<Value>) -> Json<Value> {
    let mut rows = rows.lock().unwrap();
    let mut results = Vec::new();
    for record in body["records"].as_array().cloned().unwrap_or_default() {
        if let Some(slot) = rows.iter_mut().find(|r| r["Id"] == record["Id"]) {
            *slot = record.clone();
            results.push(json!({"success": true, "data": record}));
        }
    }
    Json(json!({"success": true, "results": results}))
}

async fn start_mock_api(rows: Rows) -> String {
    let app = Router::new()
        .route("/projects/:project/tables/user/records/query", post(query))
        .route("/projects/:project/tables/user/records/:id", get(get_one))
        .route(
            "/projects/:project/tables/user/records",
            post(create).patch(update),
        )
        .with_state(rows);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn remote_accounts() -> (Rows, RemoteUserBackend, UserService) {
    let rows: Rows = Arc::new(Mutex::new(vec![json!({
        "Id": 1,
        "name": "Sarah Chen",
        "email": "sarah@artfolio.com",
        "password_hash": hash_password("password123").unwrap(),
        "bio": "Landscape painter",
        "specialties": "Oil Painting, Landscapes",
        "created_at": "2023-09-01T08:00:00Z",
        "updated_at": "2024-01-15T12:30:00Z"
    })]));
    let base_url = start_mock_api(rows.clone()).await;
    let client = RecordClient::new(RecordClientConfig {
        base_url,
        project_id: "proj".to_string(),
        public_key: "pk".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    let backend = RemoteUserBackend::new(client);
    let accounts = UserService::new(
        Arc::new(backend.clone()),
        JwtService::new(JwtConfig {
            secret: "remote-test-secret".to_string(),
            token_ttl: 3600,
        }),
    );
    (rows, backend, accounts)
}

#[tokio::test]
async fn login_against_remote_rows() {
    let (_, backend, accounts) = remote_accounts().await;
    let response = accounts
        .login(LoginCredentials {
            email: "sarah@artfolio.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, 1);
    assert_eq!(
        response.user.profile.specialties,
        vec!["Oil Painting", "Landscapes"]
    );
    assert!(backend.find_by_email("nobody@artfolio.com").await.unwrap().is_none());
}

#[tokio::test]
async fn register_writes_snake_case_row() {
    let (rows, _, accounts) = remote_accounts().await;
    let response = accounts
        .register(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine42".to_string(),
            confirm_password: "engine42".to_string(),
            profile: Profile {
                specialties: vec!["Ink".to_string(), "Etching".to_string()],
                ..Default::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, 2);

    let stored = rows.lock().unwrap()[1].clone();
    assert_eq!(stored["email"], "ada@example.com");
    assert_eq!(stored["specialties"], "Ink, Etching");
    assert!(stored["password_hash"].as_str().unwrap().starts_with("$argon2"));
    assert!(stored.get("passwordHash").is_none());

    let duplicate = accounts
        .register(RegisterRequest {
            name: "Ada Again".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine42".to_string(),
            confirm_password: "engine42".to_string(),
            profile: Profile::default(),
        })
        .await;
    assert!(matches!(duplicate, Err(AuthError::EmailTaken)));
}
