//! Report generation and download against a mocked API.

use std::time::Duration;

use fossology::{FossologyClient, FossologyError, Report, ReportFormat, RetryPolicy};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 4,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        max_wait: Duration::from_secs(5),
        jitter: false,
    }
}

fn client(server: &MockServer) -> FossologyClient {
    FossologyClient::new(&server.uri(), "test-token")
        .unwrap()
        .with_retry_policy(fast_policy())
}

#[tokio::test]
async fn test_generate_reads_id_from_message_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report"))
        .and(header("uploadId", "3"))
        .and(header("reportFormat", "spdx2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "code": 201,
            "message": "http://localhost/repo/api/v1/report/16",
            "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let id = Report::generate(&client, 3, ReportFormat::Spdx2, None)
        .await
        .unwrap();

    assert_eq!(id, 16);
}

#[tokio::test]
async fn test_generate_falls_back_to_location_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", "http://localhost/repo/api/v1/report/21")
                .set_body_json(serde_json::json!({
                    "code": 201, "message": "Report is being generated", "type": "INFO"
                })),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let id = Report::generate(&client, 3, ReportFormat::ReadmeOss, None)
        .await
        .unwrap();

    assert_eq!(id, 21);
}

#[tokio::test]
async fn test_generate_without_id_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "code": 201, "message": "Report is being generated", "type": "INFO"
        })))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = Report::generate(&client, 3, ReportFormat::Dep5, None)
        .await
        .unwrap_err();

    assert!(matches!(err, FossologyError::ApiError { .. }));
}

#[tokio::test]
async fn test_download_retries_until_ready() {
    let mock_server = MockServer::start().await;
    let content = b"SPDXVersion: SPDX-2.2\nDataLicense: CC0-1.0\n".to_vec();

    Mock::given(method("GET"))
        .and(path("/api/v1/report/16"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("Retry-After", "0")
                .set_body_json(serde_json::json!({
                    "code": 503, "message": "Report is not ready yet", "type": "INFO"
                })),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report/16"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    "attachment; filename=\"SPDX2_app.tar.gz_1700000000.rdf\"",
                )
                .set_body_bytes(content.clone()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let download = Report::download(&client, 16, None, Some(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(download.filename, "SPDX2_app.tar.gz_1700000000.rdf");
    assert_eq!(download.content, content);
}

#[tokio::test]
async fn test_download_unquoted_filename() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report/16"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Disposition", "attachment; filename=README_OSS_app.txt")
                .set_body_bytes(vec![0u8, 159, 146, 150]),
        )
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let download = Report::download(&client, 16, None, None).await.unwrap();

    assert_eq!(download.filename, "README_OSS_app.txt");
    assert_eq!(download.content, vec![0u8, 159, 146, 150]);
}

#[tokio::test]
async fn test_download_still_pending_after_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report/16"))
        .respond_with(ResponseTemplate::new(503).insert_header("Retry-After", "0"))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = Report::download(&client, 16, None, None).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_download_without_file_name_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/report/16"))
        .respond_with(ResponseTemplate::new(200).set_body_string("report"))
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = Report::download(&client, 16, None, None).await.unwrap_err();

    assert!(matches!(
        err,
        FossologyError::ApiError {
            status_code: Some(200),
            ..
        }
    ));
}
