//! Upload lifecycle endpoint tests.
//!
//! Run with: `cargo test -p parcel-api --test uploads_test`

mod helpers;

use chrono::Duration;
use helpers::{api_path, setup_test_app, setup_test_app_with, TestApp, OTHER_USER, TEST_USER};
use parcel_services::UploadRecordStore;
use serde_json::{json, Value};
use uuid::Uuid;

fn report_request() -> Value {
    json!({
        "fileName": "report.pdf",
        "fileSizeBytes": 524288,
        "contentType": "application/pdf"
    })
}

async fn create_report(app: &TestApp) -> Value {
    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&report_request())
        .await;
    assert_eq!(response.status_code(), 201);
    response.json::<Value>()
}

async fn get_metadata(app: &TestApp, file_id: &str, user: &str) -> axum_test::TestResponse {
    app.client()
        .get(&api_path(&format!("/uploads/{}", file_id)))
        .add_header("X-User-Id", user)
        .await
}

async fn confirm(app: &TestApp, file_id: &str) -> axum_test::TestResponse {
    app.client()
        .post(&api_path(&format!("/uploads/{}/confirm", file_id)))
        .add_header("X-User-Id", TEST_USER)
        .await
}

#[tokio::test]
async fn test_create_upload_returns_grant_and_pending_record() {
    let app = setup_test_app().await;

    let body = create_report(&app).await;
    let file_id = body["fileId"].as_str().unwrap().to_string();
    Uuid::parse_str(&file_id).unwrap();
    assert_eq!(body["expiresIn"], 300);
    let upload_url = body["uploadUrl"].as_str().unwrap();
    assert!(upload_url.starts_with("http://localhost:4000/files/uploads/user-1/"));
    assert!(upload_url.contains(&file_id));

    let response = get_metadata(&app, &file_id, TEST_USER).await;
    assert_eq!(response.status_code(), 200);
    let record = response.json::<Value>();
    assert_eq!(record["status"], "PENDING");
    assert_eq!(record["userId"], TEST_USER);
    assert_eq!(record["fileName"], "report.pdf");
    assert_eq!(record["fileSizeBytes"], 524288);
    assert_eq!(record["contentType"], "application/pdf");
    assert!(record["storageKey"].as_str().unwrap().contains(&file_id));
    assert_eq!(record["createdAt"], record["updatedAt"]);
}

#[tokio::test]
async fn test_oversized_file_is_rejected_without_record() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&json!({
            "fileName": "x.pdf",
            "fileSizeBytes": 2000000,
            "contentType": "application/pdf"
        }))
        .await;

    assert_eq!(response.status_code(), 413);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_unsupported_content_type_is_415() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&json!({
            "fileName": "photo.png",
            "fileSizeBytes": 1024,
            "contentType": "image/png"
        }))
        .await;

    assert_eq!(response.status_code(), 415);
    assert_eq!(response.json::<Value>()["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_content_type_match_ignores_case() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&json!({
            "fileName": "report.pdf",
            "fileSizeBytes": 1024,
            "contentType": "Application/PDF"
        }))
        .await;

    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_empty_body_fields_are_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&json!({}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "VALIDATION_ERROR");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_zero_size_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .json(&json!({
            "fileName": "report.pdf",
            "fileSizeBytes": 0,
            "contentType": "application/pdf"
        }))
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_malformed_json_is_invalid_request() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .add_header("X-User-Id", TEST_USER)
        .bytes("{not json".into())
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/uploads"))
        .json(&report_request())
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_confirm_after_object_arrives() {
    let app = setup_test_app().await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();
    let storage_key = get_metadata(&app, &file_id, TEST_USER).await.json::<Value>()["storageKey"]
        .as_str()
        .unwrap()
        .to_string();

    let early = confirm(&app, &file_id).await;
    assert_eq!(early.status_code(), 409);
    assert_eq!(early.json::<Value>()["error"], "INVALID_STATE");

    app.put_object(&storage_key).await;
    app.clock.advance(Duration::seconds(5));

    let response = confirm(&app, &file_id).await;
    assert_eq!(response.status_code(), 200);
    let record = response.json::<Value>();
    assert_eq!(record["status"], "UPLOADED");
    assert_ne!(record["updatedAt"], record["createdAt"]);
}

#[tokio::test]
async fn test_second_confirm_conflicts() {
    let app = setup_test_app_with(false).await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();

    assert_eq!(confirm(&app, &file_id).await.status_code(), 200);

    let again = confirm(&app, &file_id).await;
    assert_eq!(again.status_code(), 409);
    assert_eq!(again.json::<Value>()["error"], "INVALID_STATE");
}

#[tokio::test]
async fn test_confirm_after_expiry_rejects_record() {
    let app = setup_test_app_with(false).await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();

    app.clock.advance(Duration::seconds(300));

    let response = confirm(&app, &file_id).await;
    assert_eq!(response.status_code(), 409);

    let record = get_metadata(&app, &file_id, TEST_USER).await.json::<Value>();
    assert_eq!(record["status"], "REJECTED");
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = setup_test_app().await;

    let missing = get_metadata(&app, &Uuid::new_v4().to_string(), TEST_USER).await;
    assert_eq!(missing.status_code(), 404);
    assert_eq!(missing.json::<Value>()["error"], "NOT_FOUND");

    let malformed = get_metadata(&app, "not-a-uuid", TEST_USER).await;
    assert_eq!(malformed.status_code(), 400);
    assert_eq!(malformed.json::<Value>()["error"], "INVALID_REQUEST");

    let confirm_missing = confirm(&app, &Uuid::new_v4().to_string()).await;
    assert_eq!(confirm_missing.status_code(), 404);
}

#[tokio::test]
async fn test_other_users_records_are_not_found() {
    let app = setup_test_app_with(false).await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get_metadata(&app, &file_id, OTHER_USER).await;
    assert_eq!(response.status_code(), 404);

    let confirm_other = app
        .client()
        .post(&api_path(&format!("/uploads/{}/confirm", file_id)))
        .add_header("X-User-Id", OTHER_USER)
        .await;
    assert_eq!(confirm_other.status_code(), 404);

    let record = app
        .store
        .get(Uuid::parse_str(&file_id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status.as_str(), "PENDING");
}

#[tokio::test]
async fn test_reissued_grant_never_outlives_record() {
    let app = setup_test_app().await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();

    app.clock.advance(Duration::seconds(120));

    let response = app
        .client()
        .post(&api_path(&format!("/uploads/{}/grant", file_id)))
        .add_header("X-User-Id", TEST_USER)
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["fileId"], file_id.as_str());
    assert_eq!(body["expiresIn"], 180);

    let record = get_metadata(&app, &file_id, TEST_USER).await.json::<Value>();
    assert_eq!(record["status"], "PENDING");
    assert_eq!(record["createdAt"], record["updatedAt"]);
}

#[tokio::test]
async fn test_reissue_for_terminal_record_conflicts() {
    let app = setup_test_app_with(false).await;
    let file_id = create_report(&app).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(confirm(&app, &file_id).await.status_code(), 200);

    let response = app
        .client()
        .post(&api_path(&format!("/uploads/{}/grant", file_id)))
        .add_header("X-User-Id", TEST_USER)
        .await;
    assert_eq!(response.status_code(), 409);
}
