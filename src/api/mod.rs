//! Chronolog REST API
//!
//! HTTP API layer for Chronolog, built with Axum.
//!
//! # Endpoints
//!
//! ## Records
//! - `POST /publish` - Store a record with the given content
//! - `GET /getLast` - Most recent record (404 when empty)
//! - `GET /getByTime?start=..&end=..` - Records in an inclusive window,
//!   capped to the configured page size
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use chronolog::api::{serve, ApiConfig, AppState};
//! use chronolog::storage::{RecordStore, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store_config = StoreConfig::default();
//!     let backend = store_config.backend;
//!     let store = Arc::new(RecordStore::open(store_config)?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, backend);
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let record_routes = Router::new()
        .route("/publish", post(routes::records::publish))
        .route("/getLast", get(routes::records::get_last))
        .route("/getByTime", get(routes::records::get_by_time));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    record_routes
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Chronolog API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Chronolog API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::HealthResponse;
    use crate::storage::{IndexBackend, Record, RecordStore, StoreConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, Arc<RecordStore>) {
        let store = Arc::new(RecordStore::open(StoreConfig::default().max_page_size(2)).unwrap());
        let state = AppState::new(Arc::clone(&store), IndexBackend::Memory);
        (build_router(state), store)
    }

    fn origin() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _store) = create_test_app();
        let response = app.oneshot(get("/health/live")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _store) = create_test_app();
        let response = app.oneshot(get("/health/ready")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, store) = create_test_app();
        store.save(Record::generate(origin(), "x")).unwrap();

        let response = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = json_body(response).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.backend, "memory");
        assert_eq!(health.records, 1);
    }

    #[tokio::test]
    async fn test_get_last_empty() {
        let (app, _store) = create_test_app();
        let response = app.oneshot(get("/getLast")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_publish_then_get_last() {
        let (app, store) = create_test_app();

        let response = app
            .clone()
            .oneshot(post_json("/publish", r#"{"content": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let published: Record = json_body(response).await;
        assert_eq!(published.content, "hello");
        assert_eq!(store.len().unwrap(), 1);

        let response = app.oneshot(get("/getLast")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let last: Record = json_body(response).await;
        assert_eq!(last, published);
    }

    #[tokio::test]
    async fn test_publish_null_content() {
        let (app, store) = create_test_app();

        let response = app
            .clone()
            .oneshot(post_json("/publish", r#"{"content": null}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(post_json("/publish", "{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_invalid_json() {
        let (app, _store) = create_test_app();
        let response = app.oneshot(post_json("/publish", "not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_by_time_inclusive_and_capped() {
        let (app, store) = create_test_app();
        for (i, content) in ["a", "b", "c"].iter().enumerate() {
            let created = origin() + Duration::minutes(i as i64);
            store.save(Record::generate(created, *content)).unwrap();
        }

        let response = app
            .clone()
            .oneshot(get("/getByTime?start=2024-02-10T09:01:00&end=2024-02-10T09:01:00"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let exact: Vec<Record> = json_body(response).await;
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].content, "b");

        // Page size is 2 in this app
        let response = app
            .oneshot(get("/getByTime?start=2024-02-10T09:00:00&end=2024-02-10T09:02:00"))
            .await
            .unwrap();
        let page: Vec<Record> = json_body(response).await;
        let contents: Vec<&str> = page.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_get_by_time_reversed_bounds() {
        let (app, _store) = create_test_app();
        let response = app
            .oneshot(get("/getByTime?start=2024-02-10T10:00:00&end=2024-02-10T09:00:00"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_by_time_bad_date() {
        let (app, _store) = create_test_app();
        let response = app
            .oneshot(get("/getByTime?start=soon&end=2024-02-10T09:00:00"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
