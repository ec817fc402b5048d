//! Paginated listing against a mocked API.

use std::time::Duration;

use fossology::{
    FossologyClient, FossologyError, Job, JobListQuery, List, PageRequest, RetryPolicy, Upload,
    UploadListQuery, TOTAL_PAGES_HEADER,
};
use wiremock::matchers::{header, method, path, query_param};
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

fn upload(id: u64, name: &str) -> serde_json::Value {
    serde_json::json!({
        "folderid": 1,
        "foldername": "Software Repository",
        "id": id,
        "description": "",
        "uploadname": name,
        "uploaddate": "2024-01-01 12:00:00.000000+00"
    })
}

#[tokio::test]
async fn test_list_all_concatenates_pages_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .and(header("page", "1"))
        .and(header("limit", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(TOTAL_PAGES_HEADER, "2")
                .set_body_json(serde_json::json!([upload(1, "a.zip"), upload(2, "b.zip")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .and(header("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(TOTAL_PAGES_HEADER, "2")
                .set_body_json(serde_json::json!([upload(3, "c.zip")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let request = PageRequest::all().with_page_size(2);
    let uploads = Upload::list(&client, &UploadListQuery::default(), request)
        .await
        .unwrap();

    let ids: Vec<u64> = uploads.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(uploads.total_pages, 2);
    assert!(!uploads.has_more);
}

#[tokio::test]
async fn test_single_page_reports_remaining_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .and(header("page", "2"))
        .and(query_param("folderId", "7"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(TOTAL_PAGES_HEADER, "5")
                .set_body_json(serde_json::json!([upload(11, "k.zip")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let query = UploadListQuery {
        folder: Some(7),
        ..Default::default()
    };
    let page = Upload::list(&client, &query, PageRequest::single(2, 1))
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 5);
    assert_eq!(page.next_page(), Some(3));
}

#[tokio::test]
async fn test_missing_total_pages_means_single_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(query_param("upload", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 4, "name": "a.zip", "queueDate": "2024-01-01", "uploadId": 3, "status": "Completed"},
            {"id": 5, "name": "a.zip", "queueDate": "2024-01-02", "uploadId": 3, "status": "Queued"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let query = JobListQuery {
        upload: Some(3),
        ..Default::default()
    };
    let jobs = Job::list_all(&client, &query).await.unwrap();

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[1].id, 5);
}

#[tokio::test]
async fn test_list_retries_busy_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([upload(1, "a.zip")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let uploads = Upload::list_all(&client, &UploadListQuery::default())
        .await
        .unwrap();

    assert_eq!(uploads.len(), 1);
}

#[tokio::test]
async fn test_list_gives_up_after_max_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let err = Upload::list_all(&client, &UploadListQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FossologyError::NotReady {
            status_code: 503,
            ..
        }
    ));
}
