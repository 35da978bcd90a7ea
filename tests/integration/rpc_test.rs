//! Integration tests for the RPC envelope protocol.

mod helpers;

use axum::http::StatusCode;

use helpers::{SYNC_PASSWORD, SYNC_USER, TestApp};

#[tokio::test]
async fn test_wrong_credentials_are_login_failure() {
    let app = TestApp::new().await;

    let response = app
        .post_form("/sync/rpc/cronjob", &[("e", "5"), ("uid", SYNC_USER), ("upwd", "falsch")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["code"], 1);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_sync_credential_fields_log_in() {
    let app = TestApp::new().await;

    let body = app
        .post_form(
            "/sync/rpc/cronjob",
            &[("e", "5"), ("userID", SYNC_USER), ("userPWD", SYNC_PASSWORD)],
        )
        .await
        .json();

    assert_eq!(body["code"], 0);
    assert!(!body["token"].as_str().unwrap().is_empty());

    let legacy = app
        .post_form("/sync/rpc/cronjob", &[("e", "5"), ("uID", SYNC_USER), ("uPWD", SYNC_PASSWORD)])
        .await
        .json();
    assert_eq!(legacy["code"], 0);
}

#[tokio::test]
async fn test_token_is_reused_without_credentials() {
    let app = TestApp::new().await;

    let first = app
        .post_form("/sync/rpc/cronjob", &[("e", "5"), ("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)])
        .await
        .json();
    assert_eq!(first["code"], 0);
    let token = first["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    let second = app
        .post_form("/sync/rpc/cronjob", &[("e", "5"), ("token", &token)])
        .await
        .json();
    assert_eq!(second["code"], 0);
    assert_eq!(second["token"], token.as_str());

    let forged = app
        .post_form(
            "/sync/rpc/cronjob",
            &[("e", "5"), ("token", "forged"), ("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)],
        )
        .await
        .json();
    assert_eq!(forged["code"], 1);
}

#[tokio::test]
async fn test_cronjob_status_lists_recurring_jobs() {
    let app = TestApp::new().await;

    let body = app
        .post_form("/sync/rpc/cronjob", &[("e", "5"), ("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)])
        .await
        .json();

    let jobs = body["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 4);
    let gc = jobs.iter().find(|j| j["kind"] == 4).unwrap();
    assert_eq!(gc["enabled"], true);
    assert!(gc["last_run"].is_null());
}

#[tokio::test]
async fn test_missing_code_is_unknown() {
    let app = TestApp::new().await;

    let body = app
        .post_form("/sync/rpc/uploads", &[("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)])
        .await
        .json();

    assert_eq!(body["code"], -1);
}

#[tokio::test]
async fn test_upload_download_streams_and_removes_file() {
    let app = TestApp::new().await;
    let folder = app.uploads().join("bilder");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("1.jpg"), b"jpegdata").unwrap();

    let response = app
        .post_form(
            "/sync/rpc/uploads",
            &[("e", "2"), ("file", "bilder/1.jpg"), ("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), "application/octet-stream");
    assert_eq!(response.header("content-disposition"), "attachment; filename=\"1.jpg\"");
    assert_eq!(response.header("cache-control"), "no-store");
    assert_eq!(response.body, b"jpegdata");
    assert!(!folder.join("1.jpg").exists());
}

#[tokio::test]
async fn test_upload_traversal_is_refused() {
    let app = TestApp::new().await;

    let body = app
        .post_form(
            "/sync/rpc/uploads",
            &[("e", "4"), ("folder", "../.."), ("uid", SYNC_USER), ("upwd", SYNC_PASSWORD)],
        )
        .await
        .json();

    assert_eq!(body["code"], 3);
}

#[tokio::test]
async fn test_unknown_rpc_handler_is_not_found() {
    let app = TestApp::new().await;

    let response = app.post_form("/sync/rpc/nirgendwo", &[("e", "1")]).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
