//! Report generation and download.
//!
//! Generation is asynchronous on the server: [`Report::generate`] returns
//! an id right away and [`Report::download`] keeps asking until the
//! report is ready.

use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::StatusCode;

use crate::client::{decode_json, read_download, Download, FossologyClient, Info, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::models::enums::ReportFormat;
use crate::retry::RetryPolicy;

/// Namespace for the report endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Report;

impl Report {
    /// Ask the server to generate a report for an upload.
    ///
    /// Returns the id to pass to [`Report::download`].
    #[tracing::instrument(skip(client))]
    pub async fn generate(
        client: &FossologyClient,
        upload: u64,
        format: ReportFormat,
        group: Option<&str>,
    ) -> Result<u64> {
        let response = client
            .retry_policy()
            .run(&format!("report for upload {upload}"), || {
                let options = RequestOptions::new()
                    .header("uploadId", upload)
                    .header("reportFormat", format)
                    .group(group);
                client.get("report", options)
            })
            .await
            .map_err(|e| {
                if !matches!(e, FossologyError::Authorization { .. }) {
                    return e.context(format!("Report generation for upload {upload} failed"));
                }
                match group {
                    Some(g) => e.context(format!(
                        "Generating report for upload {upload} for group {g} not authorized"
                    )),
                    None => e.context(format!("Generating report for upload {upload} not authorized")),
                }
            })?;

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(trailing_number);
        let info: Info = decode_json(response).await?;

        let id = info
            .id()
            .or_else(|| trailing_number(&info.text()))
            .or(location)
            .ok_or_else(|| FossologyError::ApiError {
                message: format!(
                    "Report generation for upload {upload} returned no report id: {}",
                    info.text()
                ),
                status_code: Some(StatusCode::CREATED.as_u16()),
            })?;

        tracing::debug!("Generating {} report {} for upload {}", format, id, upload);
        Ok(id)
    }

    /// Download a generated report.
    ///
    /// "Not ready" answers are retried, honouring `Retry-After`, for up to
    /// `wait` (or within the client's retry policy when `wait` is unset).
    /// The content is returned exactly as sent, with the file name from
    /// `Content-Disposition`.
    #[tracing::instrument(skip(client))]
    pub async fn download(
        client: &FossologyClient,
        id: u64,
        group: Option<&str>,
        wait: Option<Duration>,
    ) -> Result<Download> {
        let policy = match wait {
            Some(wait) => client
                .retry_policy()
                .clone()
                .with_max_wait(wait)
                .with_max_attempts(u32::MAX),
            None => client.retry_policy().clone(),
        };
        download_with(client, &policy, id, group).await
    }
}

async fn download_with(
    client: &FossologyClient,
    policy: &RetryPolicy,
    id: u64,
    group: Option<&str>,
) -> Result<Download> {
    let path = format!("report/{id}");
    let response = policy
        .run(&format!("report {id}"), || {
            client.get(&path, RequestOptions::new().group(group))
        })
        .await
        .map_err(|e| e.context(format!("Download of report {id} failed")))?;

    let download = read_download(response).await?;
    tracing::debug!(
        "Report {} downloaded: {} ({} bytes)",
        id,
        download.filename,
        download.content.len()
    );
    Ok(download)
}

/// The number at the end of `text`, e.g. the id in a report URL.
fn trailing_number(text: &str) -> Option<u64> {
    let trimmed = text.trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(0, |(i, c)| i + c.len_utf8());
    trimmed[start..].parse().ok()
}
