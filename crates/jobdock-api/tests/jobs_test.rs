//! Job API integration tests.
//!
//! Run with: `cargo test -p jobdock-api --test jobs_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;

use helpers::{api_path, auth, fixtures, setup_test_app};

async fn create_job_with_file(
    client: &TestServer,
    user_id: i64,
    filename: &str,
    contents: Vec<u8>,
    content_type: &str,
) -> Value {
    let part = Part::bytes(contents)
        .file_name(filename.to_string())
        .mime_type(content_type.to_string());
    let form = MultipartForm::new().add_part("file", part);

    let response = client
        .post(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(user_id))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_requests_require_bearer_token() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/jobs")).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = app
        .client()
        .get(&api_path("/jobs"))
        .add_header("Authorization", "Bearer not-a-token")
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_job_without_file() {
    let app = setup_test_app().await;

    let form = MultipartForm::new()
        .add_text("title", "Quarterly ingest")
        .add_text("description", "No file yet");
    let response = app
        .client()
        .post(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(1))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let job = response.json::<Value>();
    assert_eq!(job["title"], "Quarterly ingest");
    assert_eq!(job["status"], "pending");
    assert_eq!(job["file_kind"], "single");
    assert!(job.get("file_name").is_none());
}

#[tokio::test]
async fn test_create_job_with_single_file_takes_filename_as_title() {
    let app = setup_test_app().await;
    let pdf = fixtures::minimal_pdf();

    let job = create_job_with_file(app.client(), 1, "report.pdf", pdf.clone(), "application/pdf")
        .await;

    assert_eq!(job["title"], "report.pdf");
    assert_eq!(job["file_name"], "report.pdf");
    assert_eq!(job["file_kind"], "single");
    assert_eq!(job["file_size"], pdf.len() as i64);
    assert_eq!(job["file_content_type"], "application/pdf");
}

#[tokio::test]
async fn test_archive_upload_records_manifest() {
    let app = setup_test_app().await;
    let client = app.client();

    let archive = fixtures::zip_with_entries(&[
        ("docs/", b""),
        ("docs/readme.md", b"# readme"),
        ("data.bin", &[0u8; 64]),
    ]);
    let job = create_job_with_file(client, 1, "bundle.zip", archive, "application/zip").await;
    assert_eq!(job["file_kind"], "archive");

    let id = job["id"].as_i64().unwrap();
    let response = client
        .get(&api_path(&format!("/jobs/{}/manifest", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let manifest = response.json::<Value>();
    let entries = manifest["entries"].as_array().unwrap();
    // Directory entries are excluded from the manifest.
    assert_eq!(entries.len(), 2);
    let readme = entries
        .iter()
        .find(|e| e["path"] == "docs/readme.md")
        .unwrap();
    assert_eq!(readme["content_type"], "text/markdown");
    assert_eq!(readme["encrypted"], false);

    let summary = &manifest["summary"];
    assert_eq!(summary["total_entries"], 2);
    assert_eq!(summary["has_encrypted"], false);
}

#[tokio::test]
async fn test_manifest_rejected_for_single_file_job() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let id = job["id"].as_i64().unwrap();

    let response = client
        .get(&api_path(&format!("/jobs/{}/manifest", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zip_bomb_rejected_and_leaves_no_row() {
    let app = setup_test_app().await;
    let client = app.client();

    let part = Part::bytes(fixtures::bomb_zip())
        .file_name("bomb.zip".to_string())
        .mime_type("application/zip".to_string());
    let form = MultipartForm::new().add_part("file", part);

    let response = client
        .post(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(1))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_REJECTED");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_traversal_zip_rejected() {
    let app = setup_test_app().await;

    let part = Part::bytes(fixtures::traversal_zip())
        .file_name("escape.zip".to_string())
        .mime_type("application/zip".to_string());
    let form = MultipartForm::new().add_part("file", part);

    let response = app
        .client()
        .post(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(1))
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_REJECTED");
}

#[tokio::test]
async fn test_jobs_are_isolated_per_owner() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let id = job["id"].as_i64().unwrap();

    // Another user sees Forbidden, not NotFound.
    let response = client
        .get(&api_path(&format!("/jobs/{}", id)))
        .add_header("Authorization", auth::bearer(2))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // An id that does not exist is NotFound for everyone.
    let response = client
        .get(&api_path(&format!("/jobs/{}", id + 999)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The other user's listing stays empty.
    let response = client
        .get(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(2))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_get_job_by_uuid() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let uuid = job["uuid"].as_str().unwrap();

    let response = client
        .get(&api_path(&format!("/jobs/uuid/{}", uuid)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let found = response.json::<Value>();
    assert_eq!(found["id"], job["id"]);
    assert_eq!(found["uuid"], job["uuid"]);

    // Ownership applies to the uuid-keyed read too.
    let response = client
        .get(&api_path(&format!("/jobs/uuid/{}", uuid)))
        .add_header("Authorization", auth::bearer(2))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // An unknown uuid is NotFound.
    let response = client
        .get(&api_path(&format!("/jobs/uuid/{}", uuid::Uuid::new_v4())))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_job_status_stamps_completed_at() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let id = job["id"].as_i64().unwrap();

    let response = client
        .patch(&api_path(&format!("/jobs/{}", id)))
        .add_header("Authorization", auth::bearer(1))
        .json(&serde_json::json!({
            "title": "Processed report",
            "status": "completed"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let updated = response.json::<Value>();
    assert_eq!(updated["title"], "Processed report");
    assert_eq!(updated["status"], "completed");
    assert!(updated["completed_at"].is_string());
}

#[tokio::test]
async fn test_delete_job_removes_row_and_object() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let id = job["id"].as_i64().unwrap();

    let response = client
        .delete(&api_path(&format!("/jobs/{}", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = client
        .get(&api_path(&format!("/jobs/{}", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // The stored object went with the row.
    let objects = match std::fs::read_dir(app._temp_dir.path().join("jobs")) {
        Ok(dir) => dir.count(),
        Err(_) => 0,
    };
    assert_eq!(objects, 0);
}

#[tokio::test]
async fn test_download_returns_original_bytes() {
    let app = setup_test_app().await;
    let client = app.client();
    let pdf = fixtures::minimal_pdf();

    let job = create_job_with_file(client, 1, "report.pdf", pdf.clone(), "application/pdf").await;
    let id = job["id"].as_i64().unwrap();

    let response = client
        .get(&api_path(&format!("/jobs/{}/file", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), pdf.as_slice());

    let disposition = response
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("report.pdf"));
}

#[tokio::test]
async fn test_file_url_generation() {
    let app = setup_test_app().await;
    let client = app.client();

    let job = create_job_with_file(
        client,
        1,
        "report.pdf",
        fixtures::minimal_pdf(),
        "application/pdf",
    )
    .await;
    let id = job["id"].as_i64().unwrap();

    let response = client
        .get(&api_path(&format!("/jobs/{}/file/url", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert!(body["url"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:4000/files/jobs/"));
    assert_eq!(body["expires_in"], 3600);

    // A zero expiry is invalid.
    let response = client
        .get(&api_path(&format!("/jobs/{}/file/url?expires=0", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_endpoints_on_job_without_file() {
    let app = setup_test_app().await;
    let client = app.client();

    let form = MultipartForm::new().add_text("title", "Bare job");
    let response = client
        .post(&api_path("/jobs"))
        .add_header("Authorization", auth::bearer(1))
        .multipart(form)
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let id = response.json::<Value>()["id"].as_i64().unwrap();

    let response = client
        .get(&api_path(&format!("/jobs/{}/file", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = client
        .get(&api_path(&format!("/jobs/{}/file/url", id)))
        .add_header("Authorization", auth::bearer(1))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
