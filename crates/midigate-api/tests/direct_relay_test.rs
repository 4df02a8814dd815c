mod common;

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tower::ServiceExt;
use wiremock::matchers::{any, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use midigate_api::{create_router, ApiConfig, AppState};
use midigate_backend::{BackendClient, BackendConfig};

use common::*;

const MIDI: &[u8] = b"MThd\x00\x00\x00\x06\x00\x01\x00\x01\x01\xe0";

fn app(server: &MockServer, upload_dir: &std::path::Path) -> Router {
    app_with_config(
        server,
        ApiConfig {
            upload_dir: upload_dir.to_path_buf(),
            ..Default::default()
        },
    )
}

fn app_with_config(server: &MockServer, config: ApiConfig) -> Router {
    let backend = BackendClient::new(BackendConfig {
        base_url: server.uri(),
        ping_timeout: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();
    create_router(AppState::direct(config, backend), None)
}

#[tokio::test]
async fn test_transcribe_returns_backend_bytes_as_midi() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .and(body_string_contains("filename=\"song.wav\""))
        .and(body_string_contains("name=\"separate_stems\""))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(MIDI.to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("song.wav", "audio/wav", b"RIFF fake wav")), &[]);

    let response = app(&server, uploads.path())
        .oneshot(upload_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "audio/midi");
    assert_eq!(body_bytes(response).await, MIDI);
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_extra_field_is_forwarded_when_supplied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .and(body_string_contains("name=\"separate_stems\"\r\n\r\ntrue"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(
        Some(("song.wav", "audio/wav", b"RIFF")),
        &[("separate_stems", "true")],
    );

    let response = app(&server, uploads.path())
        .oneshot(upload_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_each_endpoint_has_its_own_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"tempo":120}"#))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("song.wav", "audio/wav", b"RIFF")), &[]);

    let response = app(&server, uploads.path())
        .oneshot(upload_request("/analyze", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");
    assert_eq!(body_json(response).await["tempo"], 120);
}

#[tokio::test]
async fn test_missing_file_is_rejected_without_backend_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(None, &[("separate_stems", "false")]);

    let response = app(&server, uploads.path())
        .oneshot(upload_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file uploaded");
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let server = MockServer::start().await;
    let uploads = tempfile::tempdir().unwrap();

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/transcribe")
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();

    let response = app(&server, uploads.path()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn small_limit_app(server: &MockServer, upload_dir: &std::path::Path) -> Router {
    app_with_config(
        server,
        ApiConfig {
            upload_dir: upload_dir.to_path_buf(),
            max_body_size: 64,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_oversized_declared_upload_gets_json_413() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("song.wav", "audio/wav", &[0u8; 512])), &[]);
    let mut request = upload_request("/transcribe", body.clone());
    request
        .headers_mut()
        .insert("Content-Length", body.len().to_string().parse().unwrap());

    let response = small_limit_app(&server, uploads.path())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(content_type(&response), "application/json");
    let json = body_json(response).await;
    assert_eq!(json["error"], "Upload too large");
    assert_eq!(json["details"], "Payload too large: upload exceeds 64 bytes");
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_oversized_streamed_upload_gets_json_413() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("song.wav", "audio/wav", &[0u8; 512])), &[]);

    let response = small_limit_app(&server, uploads.path())
        .oneshot(upload_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "Upload too large");
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_backend_error_status_passes_through_and_cleans_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transcribe"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unsupported format"))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let body = multipart_body(Some(("notes.txt", "text/plain", b"not audio")), &[]);

    let response = app(&server, uploads.path())
        .oneshot(upload_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Backend request failed");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("unsupported format"));
    assert!(dir_is_empty(uploads.path()));
}

#[tokio::test]
async fn test_health_is_local() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let response = app(&server, uploads.path())
        .oneshot(get_request("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["mode"], "direct");
}

#[tokio::test]
async fn test_ping_falls_back_to_health_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let response = app(&server, uploads.path())
        .oneshot(get_request("/ping"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["path"], "/health");
    assert_eq!(json["fallback"], true);
}

#[tokio::test]
async fn test_ping_reports_unreachable_backend() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let uploads = tempfile::tempdir().unwrap();
    let response = app(&server, uploads.path())
        .oneshot(get_request("/ping"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
