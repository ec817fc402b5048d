//! Folder and group operations against a mocked API.

use fossology::{Folder, FossologyClient, FossologyError, Group};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn folder_json(id: u64, name: &str, parent: Option<u64>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "description": format!("{name} folder"),
        "parent": parent
    })
}

#[tokio::test]
async fn test_create_folder_returns_details() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/folders"))
        .and(header("parentFolder", "1"))
        .and(header("folderName", "Releases"))
        .and(header("folderDescription", "Release builds"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "code": 201, "message": 12, "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/folders/12"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(folder_json(12, "Releases", Some(1))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let folder = Folder::create(&client, 1, "Releases", Some("Release builds"), None)
        .await
        .unwrap();

    assert_eq!(folder.id, 12);
    assert_eq!(folder.parent, Some(1));
}

#[tokio::test]
async fn test_create_existing_folder_returns_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "message": "Folder with the same name already exists", "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Same name below another parent must not be picked
    Mock::given(method("GET"))
        .and(path("/api/v1/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            folder_json(1, "Software Repository", None),
            folder_json(4, "releases", Some(9)),
            folder_json(5, "releases", Some(1)),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let folder = Folder::create(&client, 1, "Releases", None, None)
        .await
        .unwrap();

    assert_eq!(folder.id, 5);
}

#[tokio::test]
async fn test_create_folder_in_group_not_authorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/folders"))
        .and(header("groupName", "clearing"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    let err = Folder::create(&client, 1, "Releases", None, Some("clearing"))
        .await
        .unwrap_err();

    match err {
        FossologyError::Authorization { message, .. } => {
            assert!(message.starts_with("Folder creation for group clearing in folder 1 not authorized"));
        }
        other => panic!("Expected Authorization error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_folder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/folders/12"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "code": 202, "message": "Delete Job for folder id 12", "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    Folder::delete(&client, 12, None).await.unwrap();
}

#[tokio::test]
async fn test_move_folder_sends_action() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/folders/12"))
        .and(header("parent", "3"))
        .and(header("action", "move"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    Folder::move_to(&client, 12, 3, None).await.unwrap();
}

#[tokio::test]
async fn test_find_group_ignores_case() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 2, "name": "fossy"},
            {"id": 5, "name": "Clearing"}
        ])))
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();

    let group = Group::find(&client, "clearing").await.unwrap().unwrap();
    assert_eq!(group.id, 5);
    assert!(Group::find(&client, "legal").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_group_sends_name_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/groups"))
        .and(header("name", "clearing"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200, "message": "Group clearing added.", "type": "INFO"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FossologyClient::new(&mock_server.uri(), "test-token").unwrap();
    Group::create(&client, "clearing").await.unwrap();
}
