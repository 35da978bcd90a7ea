//! Integration tests for the sync endpoint.

mod helpers;

use std::io::Read;

use axum::http::StatusCode;

use helpers::{TestApp, login_fields, zip_bytes};

#[tokio::test]
async fn test_maintenance_mode_answers_before_login() {
    let app = TestApp::with_config(|c| c.gateway.maintenance_mode = true).await;

    let response = app
        .post_form("/sync/Artikel_xml", &[("userID", "nobody"), ("userPWD", "x")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "maintenance");
}

#[tokio::test]
async fn test_wrong_password_is_status_three() {
    let app = TestApp::new().await;
    let archive = zip_bytes(&[("artikel.xml", "<artikel/>")]);

    let response = app
        .post_multipart(
            "/sync/Artikel_xml",
            &[("userID", helpers::SYNC_USER), ("userPWD", "falsch")],
            Some(("artikel.zip", &archive)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "3");
    assert!(!app.inbox("Artikel_xml").exists());
}

#[tokio::test]
async fn test_pull_stages_extracted_files() {
    let app = TestApp::new().await;
    let archive = zip_bytes(&[
        ("artikel.xml", "<artikel><kArtikel>1</kArtikel></artikel>"),
        ("preise.xml", "<preise/>"),
    ]);

    let response = app
        .post_multipart("/sync/Artikel_xml", &login_fields(), Some(("artikel.zip", &archive)))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "0");

    let mut staged: Vec<String> = std::fs::read_dir(app.inbox("Artikel_xml"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    staged.sort();
    assert_eq!(staged.len(), 2);
    assert!(staged.iter().any(|n| n.ends_with("_artikel.xml")));
    assert!(staged.iter().any(|n| n.ends_with("_preise.xml")));
}

#[tokio::test]
async fn test_corrupt_archive_is_status_two() {
    let app = TestApp::new().await;

    let response = app
        .post_multipart(
            "/sync/Artikel_xml",
            &login_fields(),
            Some(("artikel.zip", b"this is not a zip archive")),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "2");
}

#[tokio::test]
async fn test_push_delivers_outbox_as_archive() {
    let app = TestApp::new().await;
    let outbox = app.outbox("GetBestellungen_xml");
    std::fs::create_dir_all(&outbox).unwrap();
    std::fs::write(outbox.join("bestellung-1.xml"), "<bestellung id=\"1\"/>").unwrap();

    let response = app
        .post_form("/sync/GetBestellungen_xml", &login_fields())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("content-type"), "application/octet-stream");
    assert!(response.header("content-disposition").contains("GetBestellungen"));

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(response.body.clone())).unwrap();
    let mut content = String::new();
    archive
        .by_name("bestellung-1.xml")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "<bestellung id=\"1\"/>");

    assert!(!outbox.join("bestellung-1.xml").exists());
    assert!(outbox.join("sent").join("bestellung-1.xml").exists());

    let again = app
        .post_form("/sync/GetBestellungen_xml", &login_fields())
        .await;
    assert_eq!(again.text(), "0");
}

#[tokio::test]
async fn test_unknown_request_type_is_empty() {
    let app = TestApp::new().await;

    let response = app.post_form("/sync/Unbekannt_xml", &login_fields()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_last_jobs_runs_a_sweep() {
    let app = TestApp::new().await;

    let response = app.post_form("/sync/LastJobs", &login_fields()).await;

    assert_eq!(response.text(), "0");
    let gc = app.ledger.recurring(4).await.unwrap();
    assert!(gc.created_at.is_some());
}

#[tokio::test]
async fn test_errors_are_shown_only_when_enabled() {
    let quiet = TestApp::new().await;
    let response = quiet.post_form("/sync/Artikel_xml", &login_fields()).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body.is_empty());

    let verbose = TestApp::with_config(|c| c.gateway.display_errors = true).await;
    let response = verbose.post_form("/sync/Artikel_xml", &login_fields()).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.body.is_empty());
}
