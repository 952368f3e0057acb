//! Health and documentation endpoint tests.
//!
//! Run with: `cargo test -p parcel-api --test health_test`

mod helpers;

use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_health_reports_dependencies() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["record_store"], "healthy");
    assert_eq!(body["storage"], "healthy");
}

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app().await;

    let response = app.client().get("/live").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_openapi_lists_upload_paths() {
    let app = setup_test_app().await;

    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc = response.json::<Value>();
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.contains_key("/api/v1/uploads"));
    assert!(paths.contains_key("/api/v1/uploads/{file_id}"));
    assert!(paths.contains_key("/api/v1/uploads/{file_id}/confirm"));
    assert!(paths.contains_key("/api/v1/uploads/{file_id}/grant"));
}
