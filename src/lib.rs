//! FOSSology API client library.
//!
//! A Rust library for interacting with the FOSSology REST API using a
//! trait-based architecture where each operation (Get, List, Update)
//! is defined as a trait that entity types implement.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use fossology::{
//!     ApiVersion, FossologyClient, Job, JobSpec, List, PageRequest, Report, ReportFormat,
//!     Upload, UploadOptions, UploadSource,
//! };
//!
//! #[tokio::main]
//! async fn main() -> fossology::Result<()> {
//!     let client = FossologyClient::connect("http://localhost/repo", "token", ApiVersion::V1).await?;
//!     let root = client.user().map(|u| u.root_folder_id).unwrap_or(1);
//!
//!     // Upload a file and wait while the server unpacks it
//!     let options = UploadOptions {
//!         wait: Some(Duration::from_secs(10)),
//!         ..Default::default()
//!     };
//!     let upload = Upload::create(&client, root, UploadSource::File("base-files.tar.xz".into()), options).await?;
//!
//!     // Scan it and wait for the jobs to finish
//!     let spec = JobSpec::full_scan();
//!     let job = Job::schedule(&client, root, upload.id, &spec, None, Some(Duration::from_secs(60))).await?;
//!     println!("{job}");
//!
//!     // Generate and fetch a report
//!     let report = Report::generate(&client, upload.id, ReportFormat::Spdx2, None).await?;
//!     let download = Report::download(&client, report, None, Some(Duration::from_secs(30))).await?;
//!     println!("{}: {} bytes", download.filename, download.content.len());
//!
//!     // List all uploads
//!     let uploads = Upload::list(&client, &Default::default(), PageRequest::all()).await?;
//!     println!("Found {} uploads", uploads.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The library is organized around three core traits:
//!
//! - [`Get`] - Fetch a single entity by ID
//! - [`List`] - Fetch paginated collections of entities
//! - [`Update`] - Modify an existing entity
//!
//! Each entity type (like [`Upload`] or [`Folder`]) implements the traits
//! supported by its endpoints; operations that fit none of them are
//! inherent async methods. Every request goes through [`FossologyClient`],
//! and calls that can meet a busy server run under its [`RetryPolicy`].
//!
//! # Configuration
//!
//! [`FossologyClient::from_env`] reads:
//!
//! - `FOSS_TOKEN` (required) - API token, see [`obtain_token`]
//! - `FOSSOLOGY_URL` (optional) - Server URL (defaults to `http://localhost/repo`)
//! - `FOSSOLOGY_API_VERSION` (optional) - `v1` or `v2`

pub mod cli;
mod client;
pub mod config;
mod error;
mod models;
pub mod output;
mod pagination;
mod retry;
mod token;
mod traits;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::{ApiVersion, Download, FossologyClient, RequestOptions};
pub use error::{FossologyError, Result};
pub use output::PrettyPrint;
pub use pagination::{Page, PageRequest, DEFAULT_PAGE_SIZE, TOTAL_PAGES_HEADER};
pub use retry::RetryPolicy;
pub use token::{obtain_token, obtain_token_with_policy, random_token_name, TokenRequest};

// Re-export traits
pub use traits::{Get, List, Update};

// Re-export models
pub use models::*;
