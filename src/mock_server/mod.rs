//! Mock FOSSology server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the
//! FOSSology REST API for integration and end-to-end testing. Unlike
//! wiremock which mocks at the HTTP level per-test, this server maintains
//! state across requests: folders and uploads persist, jobs progress with
//! every poll and reports become ready after a configurable number of
//! "not ready" answers.
//!
//! # Example
//!
//! ```ignore
//! use fossology::mock_server::{MockServer, DEFAULT_TOKEN};
//! use fossology::{ApiVersion, Folder, FossologyClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = FossologyClient::connect(server.url(), DEFAULT_TOKEN, ApiVersion::V1)
//!         .await
//!         .unwrap();
//!
//!     let folder = Folder::create(&client, 1, "Drivers", None, None).await.unwrap();
//!     assert_eq!(folder.parent, Some(1));
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{Fixtures, DEFAULT_TOKEN, ROOT_FOLDER_ID, ROOT_FOLDER_NAME};
pub use server::MockServer;
pub use state::{MockReport, MockState, ReportPoll, SharedState};
