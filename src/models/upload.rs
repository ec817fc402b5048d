//! Upload model and trait implementations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::client::{decode_json, read_download, Download, FossologyClient, Info, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::models::common::{Findings, Hash};
use crate::models::enums::{AccessLevel, ClearingStatus};
use crate::pagination::{page_headers, read_page, Page};
use crate::retry::RetryPolicy;
use crate::traits::{Get, List, Update};

/// An upload: a file, archive or repository registered for scanning.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(rename = "folderid")]
    pub folder_id: u64,

    #[serde(rename = "foldername", default)]
    pub folder_name: String,

    pub id: u64,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "uploadname")]
    pub upload_name: String,

    /// Upload timestamp as sent by the server.
    #[serde(rename = "uploaddate", default)]
    pub upload_date: String,

    #[serde(default)]
    pub assignee: Option<u64>,

    /// Size in bytes, sent by servers before API 1.2.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(rename = "filesize", skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    #[serde(default)]
    pub hash: Option<Hash>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl Upload {
    /// Size in bytes, from the hash block or the legacy field.
    pub fn size(&self) -> Option<u64> {
        self.hash
            .as_ref()
            .and_then(|h| h.size)
            .or(self.file_size)
    }
}

impl fmt::Display for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Upload '{}' ({}) in folder '{}' ({})",
            self.upload_name, self.id, self.folder_name, self.folder_id
        )
    }
}

/// Repository reference for a VCS upload.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsSource {
    /// `git` or `svn`.
    pub vcs_type: String,
    pub vcs_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_password: Option<String>,
}

/// Remote file fetched by the server.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlSource {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Comma separated list of accepted file suffixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Comma separated list of rejected file suffixes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_recursion_depth: Option<u32>,
}

/// Path on the server's own file system.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerSource {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// What to upload.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Local file sent as multipart body.
    File(PathBuf),
    Vcs(VcsSource),
    Url(UrlSource),
    Server(ServerSource),
}

impl UploadSource {
    fn upload_type(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Vcs(_) => "vcs",
            Self::Url(_) => "url",
            Self::Server(_) => "server",
        }
    }

    /// Human-readable origin for log and error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Vcs(vcs) => vcs.vcs_url.clone(),
            Self::Url(url) => url.url.clone(),
            Self::Server(server) => server.path.clone(),
        }
    }
}

/// Optional settings for [`Upload::create`].
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub description: Option<String>,
    pub access_level: Option<AccessLevel>,
    /// Skip SCM metadata directories (`.git`, `.svn`) when unpacking.
    pub ignore_scm: bool,
    pub group: Option<String>,
    /// How long to keep retrying the detail call while the server unpacks.
    pub wait: Option<Duration>,
}

/// Filters for listing uploads.
#[derive(Debug, Clone, Default)]
pub struct UploadListQuery {
    pub folder: Option<u64>,
    /// Include uploads of sub-folders.
    pub recursive: Option<bool>,
    /// Filter by upload name (substring).
    pub name: Option<String>,
    pub status: Option<ClearingStatus>,
    /// Filter by assignee user name, `-me-` or `-unassigned-`.
    pub assignee: Option<String>,
    /// Only uploads created since this date.
    pub since: Option<NaiveDate>,
    pub group: Option<String>,
}

/// Clearing changes for an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadUpdate {
    pub status: Option<ClearingStatus>,
    pub comment: Option<String>,
    /// User id of the new assignee.
    pub assignee: Option<u64>,
    pub group: Option<String>,
}

/// Selects which license findings [`Upload::licenses`] returns.
#[derive(Debug, Clone, Default)]
pub struct LicenseFindingsQuery {
    /// Agents whose findings are requested (`nomos`, `monk`, `ojo`, ...).
    /// Empty means `nomos`.
    pub agents: Vec<String>,
    /// Include container entries.
    pub containers: bool,
    pub group: Option<String>,
}

/// Clearing summary of an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: u64,
    #[serde(default)]
    pub upload_name: String,
    #[serde(default)]
    pub main_license: Option<String>,
    #[serde(default)]
    pub unique_licenses: u64,
    #[serde(default)]
    pub total_licenses: u64,
    #[serde(default)]
    pub unique_concluded_licenses: u64,
    #[serde(default)]
    pub total_concluded_licenses: u64,
    #[serde(default)]
    pub files_to_be_cleared: u64,
    #[serde(default)]
    pub files_cleared: u64,
    #[serde(default)]
    pub clearing_status: Option<ClearingStatus>,
    #[serde(default)]
    pub copyright_count: u64,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// License findings for one file of an upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLicenses {
    pub file_path: String,
    #[serde(default)]
    pub findings: Findings,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// One copyright statement and the files it was found in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCopyrights {
    pub copyright: String,
    #[serde(default)]
    pub file_path: Vec<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl Upload {
    /// Fetch an upload.
    ///
    /// The server answers 503 while it is still unpacking a fresh upload;
    /// with `wait` set those answers are retried for up to that long.
    #[tracing::instrument(skip(client))]
    pub async fn detail(
        client: &FossologyClient,
        id: u64,
        group: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Self> {
        let policy = wait_policy(client, wait);
        let path = format!("uploads/{id}");

        let response = policy
            .run(&format!("upload {id}"), || {
                client.get(&path, RequestOptions::new().group(group))
            })
            .await
            .map_err(|e| e.context(format!("Error while getting details for upload {id}")))?;
        decode_json(response).await
    }

    /// Submit a new upload into `folder` and return its details.
    #[tracing::instrument(skip(client, options), fields(source = %source.describe()))]
    pub async fn create(
        client: &FossologyClient,
        folder: u64,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<Self> {
        let group = options.group.as_deref();
        let mut request = RequestOptions::new()
            .header("folderId", folder)
            .header_opt("uploadDescription", options.description.as_deref())
            .header_opt("public", options.access_level)
            .header("ignoreScm", options.ignore_scm)
            .header("uploadType", source.upload_type())
            .group(group);

        request = match &source {
            UploadSource::File(path) => request.multipart(file_form(path).await?),
            UploadSource::Vcs(vcs) => request.json(vcs)?,
            UploadSource::Url(url) => request.json(url)?,
            UploadSource::Server(server) => request.json(server)?,
        };

        let response = client
            .post("uploads", request)
            .await
            .map_err(|e| e.context(format!("Upload of {} failed", source.describe())))?;
        let info: Info = decode_json(response).await?;
        let id = info.id().ok_or_else(|| FossologyError::ApiError {
            message: format!(
                "Upload of {} returned no upload id: {}",
                source.describe(),
                info.text()
            ),
            status_code: Some(StatusCode::CREATED.as_u16()),
        })?;

        let upload = Self::detail(client, id, group, options.wait).await?;
        tracing::info!(
            "Upload {} ({} bytes) has been uploaded on {}",
            upload.upload_name,
            upload.size().unwrap_or_default(),
            upload.upload_date
        );
        Ok(upload)
    }

    /// Clearing summary of an upload.
    #[tracing::instrument(skip(client))]
    pub async fn summary(client: &FossologyClient, id: u64, group: Option<&str>) -> Result<Summary> {
        let path = format!("uploads/{id}/summary");
        let response = client
            .retry_policy()
            .run(&format!("summary of upload {id}"), || {
                client.get(&path, RequestOptions::new().group(group))
            })
            .await
            .map_err(|e| e.context(format!("No summary for upload {id}")))?;
        decode_json(response).await
    }

    /// License findings of an upload's files.
    #[tracing::instrument(skip(client))]
    pub async fn licenses(
        client: &FossologyClient,
        id: u64,
        query: &LicenseFindingsQuery,
    ) -> Result<Vec<UploadLicenses>> {
        let agents = if query.agents.is_empty() {
            "nomos".to_string()
        } else {
            query.agents.join(",")
        };
        let path = format!("uploads/{id}/licenses");

        let response = client
            .retry_policy()
            .run(&format!("licenses of upload {id}"), || {
                let options = RequestOptions::new()
                    .query("agent", &agents)
                    .query("containers", query.containers)
                    .group(query.group.as_deref());
                client.get(&path, options)
            })
            .await
            .map_err(|e| {
                if e.status_code() == Some(StatusCode::PRECONDITION_FAILED.as_u16()) {
                    e.context(format!(
                        "Unable to get licenses from {agents} for upload {id}, agent not scheduled"
                    ))
                } else {
                    e.context(format!("No licenses for upload {id}"))
                }
            })?;
        decode_json(response).await
    }

    /// Copyright statements found in an upload.
    #[tracing::instrument(skip(client))]
    pub async fn copyrights(
        client: &FossologyClient,
        id: u64,
        group: Option<&str>,
    ) -> Result<Vec<UploadCopyrights>> {
        let path = format!("uploads/{id}/copyrights");
        let response = client
            .retry_policy()
            .run(&format!("copyrights of upload {id}"), || {
                client.get(&path, RequestOptions::new().group(group))
            })
            .await
            .map_err(|e| e.context(format!("No copyrights for upload {id}")))?;
        decode_json(response).await
    }

    /// Delete an upload. The server schedules the deletion.
    #[tracing::instrument(skip(client))]
    pub async fn delete(client: &FossologyClient, id: u64, group: Option<&str>) -> Result<()> {
        client
            .delete(&format!("uploads/{id}"), RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context(format!("Unable to delete upload {id}")))?;
        tracing::info!("Upload {} has been scheduled for deletion", id);
        Ok(())
    }

    /// Move an upload to another folder.
    pub async fn move_to(
        client: &FossologyClient,
        id: u64,
        folder: u64,
        group: Option<&str>,
    ) -> Result<()> {
        Self::put(client, "move", id, folder, group).await
    }

    /// Copy an upload into another folder.
    pub async fn copy_to(
        client: &FossologyClient,
        id: u64,
        folder: u64,
        group: Option<&str>,
    ) -> Result<()> {
        Self::put(client, "copy", id, folder, group).await
    }

    #[tracing::instrument(skip(client))]
    async fn put(
        client: &FossologyClient,
        action: &str,
        id: u64,
        folder: u64,
        group: Option<&str>,
    ) -> Result<()> {
        let options = RequestOptions::new()
            .header("folderId", folder)
            .header("action", action)
            .group(group);
        client
            .put(&format!("uploads/{id}"), options)
            .await
            .map_err(|e| e.context(format!("Unable to {action} upload {id} to folder {folder}")))?;
        tracing::info!("Upload {} has been {}d to folder {}", id, action, folder);
        Ok(())
    }

    /// Download the uploaded file.
    #[tracing::instrument(skip(client))]
    pub async fn download(client: &FossologyClient, id: u64, group: Option<&str>) -> Result<Download> {
        let response = client
            .get(&format!("uploads/{id}/download"), RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context(format!("Unable to download upload {id}")))?;
        read_download(response).await
    }
}

#[async_trait]
impl Get for Upload {
    type Id = u64;

    async fn get(client: &FossologyClient, id: u64) -> Result<Self> {
        Self::detail(client, id, None, None).await
    }
}

#[async_trait]
impl List for Upload {
    type Query = UploadListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &FossologyClient,
        query: &Self::Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        let options = RequestOptions::new()
            .query_opt("folderId", query.folder)
            .query_opt("recursive", query.recursive)
            .query_opt("name", query.name.as_deref())
            .query_opt("status", query.status)
            .query_opt("assignee", query.assignee.as_deref())
            .query_opt("since", query.since.map(|d| d.format("%Y-%m-%d")))
            .group(query.group.as_deref());

        let response = client
            .get("uploads", page_headers(options, page, page_size))
            .await
            .map_err(|e| e.context("Unable to retrieve the list of uploads"))?;
        read_page(response, page, page_size).await
    }
}

#[async_trait]
impl Update for Upload {
    type Id = u64;
    type Params = UploadUpdate;

    #[tracing::instrument(skip(client))]
    async fn update(client: &FossologyClient, id: u64, params: UploadUpdate) -> Result<Self> {
        let group = params.group.as_deref();
        let options = RequestOptions::new()
            .query_opt("status", params.status)
            .query_opt("assignee", params.assignee)
            .query_opt("comment", params.comment.as_deref())
            .group(group);

        client
            .patch(&format!("uploads/{id}"), options)
            .await
            .map_err(|e| e.context(format!("Unable to update upload {id}")))?;
        Self::detail(client, id, group, None).await
    }
}

/// Retry policy bounded by a caller-supplied wait; no wait means one attempt.
pub(crate) fn wait_policy(client: &FossologyClient, wait: Option<Duration>) -> RetryPolicy {
    match wait {
        Some(wait) => client
            .retry_policy()
            .clone()
            .with_max_wait(wait)
            .with_max_attempts(u32::MAX),
        None => RetryPolicy::none(),
    }
}

async fn file_form(path: &Path) -> Result<Form> {
    let content = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            FossologyError::InvalidArgument(format!("{} is not a file", path.display()))
        })?;

    let part = Part::bytes(content).file_name(file_name);
    Ok(Form::new().part("fileInput", part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upload_json() -> Value {
        json!({
            "folderid": 2,
            "foldername": "Software Repository",
            "id": 12,
            "description": "upload via foss-cli",
            "uploadname": "base-files_11.tar.xz",
            "uploaddate": "2023-01-01 10:00:00.000000+00",
            "assignee": null,
            "hash": {"sha1": "a", "md5": "b", "sha256": "c", "size": 1024},
            "assigneeDate": null,
            "closingDate": null
        })
    }

    #[test]
    fn test_upload_deserialize() {
        let upload: Upload = serde_json::from_value(upload_json()).unwrap();
        assert_eq!(upload.id, 12);
        assert_eq!(upload.folder_id, 2);
        assert_eq!(upload.size(), Some(1024));
        assert!(upload.additional_info.contains_key("assigneeDate"));
    }

    #[test]
    fn test_upload_round_trip_keeps_unknown_fields() {
        let input = upload_json();
        let upload: Upload = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(serde_json::to_value(&upload).unwrap(), input);
    }

    #[test]
    fn test_legacy_filesize() {
        let upload: Upload = serde_json::from_value(json!({
            "folderid": 1,
            "foldername": "Root",
            "id": 3,
            "description": "",
            "uploadname": "a.zip",
            "uploaddate": "2020-01-01",
            "filesize": "77"
        }))
        .unwrap();
        assert_eq!(upload.size(), Some(77));
        assert!(upload.hash.is_none());
    }

    #[test]
    fn test_summary_deserialize() {
        let summary: Summary = serde_json::from_value(json!({
            "id": 12,
            "uploadName": "base-files_11.tar.xz",
            "mainLicense": null,
            "uniqueLicenses": 4,
            "totalLicenses": 9,
            "uniqueConcludedLicenses": 0,
            "totalConcludedLicenses": 0,
            "filesToBeCleared": 9,
            "filesCleared": 0,
            "clearingStatus": "Open",
            "copyrightCount": 35,
            "assignee": null
        }))
        .unwrap();
        assert_eq!(summary.clearing_status, Some(ClearingStatus::Open));
        assert_eq!(summary.copyright_count, 35);
        assert!(summary.additional_info.contains_key("assignee"));
    }

    #[test]
    fn test_upload_licenses_deserialize() {
        let licenses: Vec<UploadLicenses> = serde_json::from_value(json!([
            {
                "filePath": "base-files_11.tar.xz/base-files-11/licenses/GPL-2",
                "findings": {"scanner": ["GPL-2.0-only"], "conclusion": null, "copyright": null}
            }
        ]))
        .unwrap();
        assert_eq!(licenses[0].findings.scanner, vec!["GPL-2.0-only"]);
    }

    #[test]
    fn test_vcs_source_serialize() {
        let vcs = VcsSource {
            vcs_type: "git".to_string(),
            vcs_url: "https://github.com/fossology/fossology-python".to_string(),
            vcs_branch: Some("main".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&vcs).unwrap();
        assert_eq!(value["vcsType"], json!("git"));
        assert_eq!(value["vcsBranch"], json!("main"));
        assert!(value.get("vcsPassword").is_none());
    }

    #[test]
    fn test_source_describe() {
        let source = UploadSource::File(PathBuf::from("tests/files/base-files_11.tar.xz"));
        assert_eq!(source.upload_type(), "file");
        assert!(source.describe().ends_with("base-files_11.tar.xz"));
    }
}
