//! Job model, job specification and trait implementations.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::client::{decode_json, FossologyClient, Info, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::models::enums::JobStatus;
use crate::pagination::{page_headers, read_page, Page};
use crate::traits::{Get, List};

/// A scan job running against an upload.
///
/// Jobs move from `Queued` to `Processing` and end up `Completed` or
/// `Failed`. Ids arrive as numbers or numeric strings depending on the
/// server version.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Queue timestamp as sent by the server.
    #[serde(default)]
    pub queue_date: String,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub upload_id: Option<u64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub user_id: Option<u64>,

    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub group_id: Option<u64>,

    /// Estimated seconds until completion.
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    pub eta: Option<u64>,

    #[serde(default)]
    pub status: JobStatus,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Job '{}' ({}) queued on {} (Status: {} ETA: {})",
            self.name,
            self.id,
            self.queue_date,
            self.status,
            self.eta.unwrap_or_default()
        )
    }
}

/// Scanner agents to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Analysis {
    pub bucket: bool,
    pub copyright_email_author: bool,
    /// Export control and customs.
    pub ecc: bool,
    pub keyword: bool,
    pub mime: bool,
    pub monk: bool,
    pub nomos: bool,
    pub ojo: bool,
    pub package: bool,
    pub reso: bool,
    pub heritage: bool,
    pub specific_agent: bool,
}

/// Post-processing deciders to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Decider {
    pub nomos_monk: bool,
    pub bulk_reused: bool,
    pub new_scanner: bool,
    pub ojo_decider: bool,
}

/// Reuse of clearing decisions from an earlier upload.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Reuse {
    /// Upload whose decisions are reused, 0 for none.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub reuse_upload: u64,
    /// Group owning that upload, 0 for none.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub reuse_group: u64,
    pub reuse_main: bool,
    pub reuse_enhanced: bool,
    pub reuse_report: bool,
    pub reuse_copyright: bool,
}

/// Job specification sent when scheduling.
///
/// Parsing rejects unknown agent, decider or reuse names instead of
/// letting the server ignore them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobSpec {
    pub analysis: Analysis,
    pub decider: Decider,
    pub reuse: Reuse,
}

impl JobSpec {
    /// Parse a specification from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FossologyError::InvalidArgument(format!("invalid job specification: {e}")))
    }

    /// Every agent and decider enabled, with reuse of the main license.
    pub fn full_scan() -> Self {
        Self {
            analysis: Analysis {
                bucket: true,
                copyright_email_author: true,
                ecc: true,
                keyword: true,
                mime: true,
                monk: true,
                nomos: true,
                ojo: true,
                package: true,
                reso: false,
                heritage: false,
                specific_agent: true,
            },
            decider: Decider {
                nomos_monk: true,
                bulk_reused: true,
                new_scanner: true,
                ojo_decider: true,
            },
            reuse: Reuse {
                reuse_upload: 0,
                reuse_group: 0,
                reuse_main: true,
                reuse_enhanced: true,
                reuse_report: true,
                reuse_copyright: true,
            },
        }
    }
}

/// Filters for listing jobs.
#[derive(Debug, Clone, Default)]
pub struct JobListQuery {
    /// Only jobs of this upload.
    pub upload: Option<u64>,
    /// Jobs of all users (administrators only).
    pub all: bool,
    pub group: Option<String>,
}

impl Job {
    /// Fetch a job.
    ///
    /// With `wait`, polls until the job is `Completed` or `Failed` and
    /// fails with [`FossologyError::Timeout`] once `wait` has elapsed.
    #[tracing::instrument(skip(client))]
    pub async fn detail(client: &FossologyClient, id: u64, wait: Option<Duration>) -> Result<Self> {
        let path = format!("jobs/{id}");
        let path = path.as_str();
        let fetch = move || async move {
            let response = client
                .get(path, RequestOptions::new())
                .await
                .map_err(|e| e.context(format!("Error while getting details for job {id}")))?;
            decode_json::<Job>(response).await
        };

        let job = match wait {
            Some(timeout) => {
                client
                    .retry_policy()
                    .poll(&format!("job {id}"), timeout, fetch, |job: &Job| {
                        job.status.is_terminal()
                    })
                    .await?
            }
            None => fetch().await?,
        };

        tracing::debug!("Got details for job {}: {}", id, job.status);
        Ok(job)
    }

    /// Schedule jobs for an upload.
    ///
    /// Returns the job as soon as it is queued, or, with `wait`, once it
    /// has finished.
    #[tracing::instrument(skip(client, spec))]
    pub async fn schedule(
        client: &FossologyClient,
        folder: u64,
        upload: u64,
        spec: &JobSpec,
        group: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Self> {
        let options = RequestOptions::new()
            .header("folderId", folder)
            .header("uploadId", upload)
            .group(group)
            .json(spec)?;

        let response = client.post("jobs", options).await.map_err(|e| {
            if matches!(e, FossologyError::Authorization { .. }) {
                e.context("Scheduling job not authorized")
            } else {
                e.context(format!("Scheduling jobs for upload {upload} failed"))
            }
        })?;

        let info: Info = decode_json(response).await?;
        let id = info.id().ok_or_else(|| FossologyError::ApiError {
            message: format!("Scheduling jobs for upload {upload} returned no job id: {}", info.text()),
            status_code: Some(201),
        })?;
        tracing::info!("Scheduled job {} for upload {}", id, upload);

        Self::detail(client, id, wait).await
    }
}

#[async_trait]
impl Get for Job {
    type Id = u64;

    async fn get(client: &FossologyClient, id: u64) -> Result<Self> {
        Self::detail(client, id, None).await
    }
}

#[async_trait]
impl List for Job {
    type Query = JobListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &FossologyClient,
        query: &Self::Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        let path = if query.all { "jobs/all" } else { "jobs" };
        let options = RequestOptions::new()
            .query_opt("upload", query.upload)
            .group(query.group.as_deref());

        let response = client
            .get(path, page_headers(options, page, page_size))
            .await
            .map_err(|e| e.context("Getting the list of jobs failed"))?;
        read_page(response, page, page_size).await
    }
}
