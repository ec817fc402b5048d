//! Per-file endpoints of an upload against a mocked API.

use fossology::{
    BulkAction, BulkScanSpec, ClearingType, CopyrightStatus, FossologyClient, FossologyError,
    Item, LicenseAction, PrevNextSelection, Upload,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upload() -> Upload {
    serde_json::from_value(serde_json::json!({
        "folderid": 1,
        "foldername": "Software Repository",
        "id": 3,
        "description": "",
        "uploadname": "base-files_11.tar.xz",
        "uploaddate": "2024-01-01 12:00:00.000000+00"
    }))
    .unwrap()
}

#[tokio::test]
async fn test_item_info() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/40/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "viewInfo": {"itemId": 40, "filename": "LICENSE"},
            "metaInfo": {"mimeType": "text/plain", "sha1": "abc"},
            "packageInfo": {},
            "tagInfo": [],
            "reuseInfo": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let info = Item::info(&client, &upload(), 40).await.unwrap();

    assert_eq!(info.meta_info["mimeType"], "text/plain");
    assert_eq!(info.view_info["filename"], "LICENSE");
}

#[tokio::test]
async fn test_unknown_item_names_upload_and_item() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/1/info"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": 404, "message": "Item does not exist", "type": "ERROR"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let err = Item::info(&client, &upload(), 1).await.unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("Upload 3 or item 1 not found"));
}

#[tokio::test]
async fn test_server_error_names_upload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/1/clearing-history"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let err = Item::clearing_history(&client, &upload(), 1)
        .await
        .unwrap_err();

    match err {
        FossologyError::ApiError { message, status_code } => {
            assert_eq!(status_code, Some(500));
            assert!(message.starts_with(
                "API error while getting clearing history for item 1 from upload base-files_11.tar.xz"
            ));
        }
        other => panic!("Expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_total_copyrights_sends_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/40/totalcopyrights"))
        .and(query_param("status", "active"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"total_copyrights": 4})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let total = Item::total_copyrights(&client, &upload(), 40, CopyrightStatus::Active)
        .await
        .unwrap();

    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_clearing_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/40/clearing-history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "date": "2024-01-02",
            "username": "fossy",
            "scope": "global",
            "type": "IDENTIFIED",
            "addedLicenses": ["BSD-3-Clause"],
            "removedLicenses": ["MIT"]
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let history = Item::clearing_history(&client, &upload(), 40)
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(history[0].clearing_type(), Some(ClearingType::Identified));
    assert_eq!(history[0].removed_licenses, vec!["MIT"]);
}

#[tokio::test]
async fn test_prev_next_with_selection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/40/prev-next"))
        .and(query_param("selection", "noClearing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prevItemId": 38, "nextItemId": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let prev_next = Item::prev_next(&client, &upload(), 40, Some(PrevNextSelection::NoClearing))
        .await
        .unwrap();

    assert_eq!(prev_next.prev_item_id, Some(38));
    assert_eq!(prev_next.next_item_id, None);
}

#[tokio::test]
async fn test_bulk_scan_then_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/uploads/3/item/40/bulk-scan"))
        .and(body_partial_json(serde_json::json!({
            "refText": "Permission is hereby granted",
            "bulkScope": "upload",
            "bulkActions": [{"licenseShortName": "MIT", "licenseAction": "ADD"}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "code": 201, "message": 12, "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/uploads/3/item/40/bulk-history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "bulkId": 5,
            "clearingEventId": 9,
            "text": "Permission is hereby granted",
            "matched": true,
            "tried": true,
            "addedLicenses": ["MIT"],
            "removedLicenses": []
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let spec = BulkScanSpec::new(
        "Permission is hereby granted",
        vec![BulkAction::new("MIT", LicenseAction::Add)],
    );
    Item::schedule_bulk_scan(&client, &upload(), 40, &spec)
        .await
        .unwrap();

    let history = Item::bulk_history(&client, &upload(), 40).await.unwrap();
    assert_eq!(history[0].added_licenses, vec!["MIT"]);
    assert!(history[0].matched);
}

#[tokio::test]
async fn test_bad_bulk_scan_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/uploads/3/item/40/bulk-scan"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": 400, "message": "refText is required", "type": "ERROR"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let spec = BulkScanSpec::new("", Vec::new());
    let err = Item::schedule_bulk_scan(&client, &upload(), 40, &spec)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(err
        .to_string()
        .contains("Bad bulk scan request for upload 3, item 40: refText is required (400)"));
}
