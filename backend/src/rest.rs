//! # Record API
//!
//! HTTP handlers translating verbs on `/data` and `/search` into record
//! service calls, plus `/entity` so the page can pick the matching form and
//! cards. Every failure is logged and answered with status 500 and an
//! [`ApiErrorBody`].

use std::path::PathBuf;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use shared::{ApiErrorBody, EntityInfo, Fields};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::db::StoreError;
use crate::domain::RecordService;

/// Application state containing the RecordService
#[derive(Clone)]
pub struct AppState {
    pub record_service: RecordService,
}

impl AppState {
    pub fn new(record_service: RecordService) -> Self {
        Self { record_service }
    }
}

/// Query parameters for GET /search
#[derive(Deserialize, Debug, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub terms: String,
}

fn failure(message: &str, err: StoreError) -> Response {
    error!("{}: {}", message, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiErrorBody::new(message, err.to_string())),
    )
        .into_response()
}

/// GET /entity
pub async fn get_entity(State(state): State<AppState>) -> Json<EntityInfo> {
    Json(EntityInfo {
        entity: state.record_service.kind(),
    })
}

/// POST /data
pub async fn create_record(
    State(state): State<AppState>,
    Json(fields): Json<Fields>,
) -> impl IntoResponse {
    info!("POST /data - {} fields", fields.len());

    match state.record_service.create(fields).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => failure("Failed to create record", e),
    }
}

/// GET /data
pub async fn list_records(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /data");

    match state.record_service.list().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => failure("Failed to fetch records", e),
    }
}

/// GET /search?terms=
pub async fn search_records(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    info!("GET /search - terms: {:?}", query.terms);

    match state.record_service.search(&query.terms).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => failure("Search failed", e),
    }
}

/// PUT /data/:id
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Fields>,
) -> impl IntoResponse {
    info!("PUT /data/{} - {} fields", id, fields.len());

    match state.record_service.update(&id, fields).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => failure("Failed to update record", e),
    }
}

/// DELETE /data/:id
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /data/{}", id);

    match state.record_service.delete(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => failure("Failed to delete record", e),
    }
}

/// Create the Axum router: the record API plus the static frontend as fallback
pub fn create_router(app_state: AppState, cors_origin: HeaderValue, static_dir: PathBuf) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/data", get(list_records).post(create_record))
        .route("/data/:id", put(update_record).delete(delete_record))
        .route("/search", get(search_records))
        .route("/entity", get(get_entity))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbConnection, DocumentStore, FindMany};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use shared::{EntityKind, Record};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Router over a fresh in-memory database
    async fn setup_test_router(kind: EntityKind) -> Router {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        router_with_store(Arc::new(db), kind)
    }

    fn router_with_store(store: Arc<dyn DocumentStore>, kind: EntityKind) -> Router {
        let state = AppState::new(RecordService::new(store, kind.schema()));
        create_router(
            state,
            HeaderValue::from_static("http://localhost:8080"),
            PathBuf::from("does-not-exist"),
        )
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_create_returns_201_with_generated_id() {
        let router = setup_test_router(EntityKind::Cats).await;

        let (status, body) = send(
            &router,
            Method::POST,
            "/data",
            Some(json!({"id": "mine", "name": "Tom", "isAdopted": false, "appetite": null})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap();
        assert_ne!(id, "mine");
        assert_eq!(body["name"], json!("Tom"));
        assert_eq!(body["isAdopted"], json!(false));
        assert_eq!(body["appetite"], Value::Null);
    }

    #[tokio::test]
    async fn test_entity_reports_configured_kind() {
        let router = setup_test_router(EntityKind::Recipes).await;
        let (status, body) = send(&router, Method::GET, "/entity", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"entity": "recipes"}));

        let router = setup_test_router(EntityKind::Cats).await;
        let (_, body) = send(&router, Method::GET, "/entity", None).await;
        assert_eq!(body, json!({"entity": "cats"}));
    }

    #[tokio::test]
    async fn test_list_empty_collection() {
        let router = setup_test_router(EntityKind::Cats).await;
        let (status, body) = send(&router, Method::GET, "/data", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_crud_lifecycle() {
        let router = setup_test_router(EntityKind::Recipes).await;

        let (_, created) = send(
            &router,
            Method::POST,
            "/data",
            Some(json!({"title": "Stew", "type": "meal", "calories": 450})),
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = send(
            &router,
            Method::PUT,
            &format!("/data/{}", id),
            Some(json!({"id": id, "title": "Beef stew", "type": "meal"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated, json!({"id": id, "title": "Beef stew", "type": "meal"}));

        let (_, listed) = send(&router, Method::GET, "/data", None).await;
        assert_eq!(listed, json!([{"id": id, "title": "Beef stew", "type": "meal"}]));

        let (status, deleted) = send(&router, Method::DELETE, &format!("/data/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["title"], json!("Beef stew"));

        let (_, listed) = send(&router, Method::GET, "/data", None).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_search_filters_and_sorts() {
        let router = setup_test_router(EntityKind::Cats).await;
        for name in ["Zelda", "tom", "Tomato", "Bob"] {
            send(&router, Method::POST, "/data", Some(json!({"name": name}))).await;
        }

        let (status, body) = send(&router, Method::GET, "/search?terms=TOM", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Tomato", "tom"]);

        let (_, body) = send(&router, Method::GET, "/search", None).await;
        assert_eq!(body.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_500_with_details() {
        let router = setup_test_router(EntityKind::Cats).await;
        let (status, body) = send(&router, Method::PUT, "/data/missing", Some(json!({"name": "x"}))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Failed to update record"));
        assert!(body["details"].as_str().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_500() {
        let router = setup_test_router(EntityKind::Cats).await;
        let (status, body) = send(&router, Method::DELETE, "/data/missing", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Failed to delete record"));
    }

    /// A store whose every call fails, standing in for an unreachable database
    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn create(&self, _: &str, _: Fields) -> Result<Record, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
        async fn find_many(&self, _: &str, _: &FindMany) -> Result<Vec<Record>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
        async fn update(&self, _: &str, _: &str, _: Fields) -> Result<Record, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<Record, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    #[tokio::test]
    async fn test_store_failures_map_to_error_bodies() {
        let router = router_with_store(Arc::new(BrokenStore), EntityKind::Cats);

        let (status, body) = send(&router, Method::GET, "/data", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], json!("Failed to fetch records"));
        assert!(body["details"].is_string());

        let (_, body) = send(&router, Method::POST, "/data", Some(json!({"name": "x"}))).await;
        assert_eq!(body["error"], json!("Failed to create record"));

        let (_, body) = send(&router, Method::GET, "/search?terms=x", None).await;
        assert_eq!(body["error"], json!("Search failed"));
    }
}
