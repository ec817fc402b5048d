//! Endpoints for single files of an upload: `uploads/{id}/item/{itemId}`.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::models::enums::{
    BulkScope, ClearingScope, ClearingType, CopyrightStatus, LicenseAction, PrevNextSelection,
};
use crate::models::upload::Upload;

/// Everything the server knows about one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(default)]
    pub view_info: Map<String, Value>,
    #[serde(default)]
    pub meta_info: Map<String, Value>,
    #[serde(default)]
    pub package_info: Map<String, Value>,
    #[serde(default)]
    pub tag_info: Value,
    #[serde(default)]
    pub reuse_info: Map<String, Value>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// One clearing decision taken on a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearingHistory {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "type", default)]
    pub clearing_type: String,
    #[serde(default)]
    pub added_licenses: Vec<String>,
    #[serde(default)]
    pub removed_licenses: Vec<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl ClearingHistory {
    /// Scope as a known value, `None` for anything else.
    pub fn scope(&self) -> Option<ClearingScope> {
        self.scope.parse().ok()
    }

    /// Decision type as a known value, `None` for anything else.
    pub fn clearing_type(&self) -> Option<ClearingType> {
        self.clearing_type.parse().ok()
    }
}

/// One bulk scan that touched a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkHistory {
    pub bulk_id: u64,
    #[serde(default)]
    pub clearing_event_id: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub matched: bool,
    #[serde(default)]
    pub tried: bool,
    #[serde(default)]
    pub added_licenses: Vec<String>,
    #[serde(default)]
    pub removed_licenses: Vec<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Neighbours of a file in clearing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrevNextItem {
    #[serde(default)]
    pub prev_item_id: Option<u64>,
    #[serde(default)]
    pub next_item_id: Option<u64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// A license decision applied wherever the reference text matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAction {
    pub license_short_name: String,
    #[serde(default)]
    pub license_text: String,
    #[serde(default)]
    pub acknowledgement: String,
    #[serde(default)]
    pub comment: String,
    pub license_action: LicenseAction,
}

impl BulkAction {
    pub fn new(license_short_name: impl Into<String>, license_action: LicenseAction) -> Self {
        Self {
            license_short_name: license_short_name.into(),
            license_text: String::new(),
            acknowledgement: String::new(),
            comment: String::new(),
            license_action,
        }
    }
}

/// Body of a bulk scan request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkScanSpec {
    pub bulk_actions: Vec<BulkAction>,
    /// Text searched for in the files.
    pub ref_text: String,
    pub bulk_scope: BulkScope,
    pub force_decision: bool,
    pub ignore_irre: bool,
    pub delimiters: String,
    pub scan_only_findings: bool,
}

impl BulkScanSpec {
    /// Scan for `ref_text` in the whole upload with server defaults.
    pub fn new(ref_text: impl Into<String>, bulk_actions: Vec<BulkAction>) -> Self {
        Self {
            bulk_actions,
            ref_text: ref_text.into(),
            bulk_scope: BulkScope::Upload,
            force_decision: false,
            ignore_irre: false,
            delimiters: "DEFAULT".to_string(),
            scan_only_findings: false,
        }
    }
}

#[derive(Deserialize)]
struct TotalCopyrights {
    total_copyrights: u64,
}

/// Operations on one file (item) of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item;

impl Item {
    /// File details: view, meta, package, tag and reuse information.
    #[tracing::instrument(skip(client, upload), fields(upload = upload.id))]
    pub async fn info(client: &FossologyClient, upload: &Upload, item: u64) -> Result<FileInfo> {
        let path = format!("uploads/{}/item/{item}/info", upload.id);
        let response = client
            .get(&path, RequestOptions::new())
            .await
            .map_err(|e| item_error(e, upload, item, "getting info for item"))?;
        decode_json(response).await
    }

    /// Number of copyright statements with the given status.
    #[tracing::instrument(skip(client, upload), fields(upload = upload.id))]
    pub async fn total_copyrights(
        client: &FossologyClient,
        upload: &Upload,
        item: u64,
        status: CopyrightStatus,
    ) -> Result<u64> {
        let path = format!("uploads/{}/item/{item}/totalcopyrights", upload.id);
        let response = client
            .get(&path, RequestOptions::new().query("status", status))
            .await
            .map_err(|e| item_error(e, upload, item, "getting total copyrights for item"))?;
        let total: TotalCopyrights = decode_json(response).await?;
        Ok(total.total_copyrights)
    }

    /// Clearing decisions taken on the file, oldest first.
    #[tracing::instrument(skip(client, upload), fields(upload = upload.id))]
    pub async fn clearing_history(
        client: &FossologyClient,
        upload: &Upload,
        item: u64,
    ) -> Result<Vec<ClearingHistory>> {
        let path = format!("uploads/{}/item/{item}/clearing-history", upload.id);
        let response = client
            .get(&path, RequestOptions::new())
            .await
            .map_err(|e| item_error(e, upload, item, "getting clearing history for item"))?;
        decode_json(response).await
    }

    /// Previous and next file to clear, relative to `item`.
    #[tracing::instrument(skip(client, upload), fields(upload = upload.id))]
    pub async fn prev_next(
        client: &FossologyClient,
        upload: &Upload,
        item: u64,
        selection: Option<PrevNextSelection>,
    ) -> Result<PrevNextItem> {
        let path = format!("uploads/{}/item/{item}/prev-next", upload.id);
        let response = client
            .get(&path, RequestOptions::new().query_opt("selection", selection))
            .await
            .map_err(|e| item_error(e, upload, item, "getting prev-next items for"))?;
        decode_json(response).await
    }

    /// Bulk scans that ran over the file.
    #[tracing::instrument(skip(client, upload), fields(upload = upload.id))]
    pub async fn bulk_history(
        client: &FossologyClient,
        upload: &Upload,
        item: u64,
    ) -> Result<Vec<BulkHistory>> {
        let path = format!("uploads/{}/item/{item}/bulk-history", upload.id);
        let response = client
            .get(&path, RequestOptions::new())
            .await
            .map_err(|e| item_error(e, upload, item, "getting bulk history for"))?;
        decode_json(response).await
    }

    /// Schedule a bulk scan starting at `item`.
    #[tracing::instrument(skip(client, upload, spec), fields(upload = upload.id))]
    pub async fn schedule_bulk_scan(
        client: &FossologyClient,
        upload: &Upload,
        item: u64,
        spec: &BulkScanSpec,
    ) -> Result<()> {
        let path = format!("uploads/{}/item/{item}/bulk-scan", upload.id);
        client
            .post(&path, RequestOptions::new().json(spec)?)
            .await
            .map_err(|e| {
                if e.status_code() == Some(StatusCode::BAD_REQUEST.as_u16()) {
                    e.context(format!(
                        "Bad bulk scan request for upload {}, item {item}",
                        upload.id
                    ))
                } else {
                    item_error(e, upload, item, "scheduling bulk scan for item")
                }
            })?;

        tracing::info!(
            "Bulk scan scheduled for upload {}, item {}",
            upload.upload_name,
            item
        );
        Ok(())
    }
}

fn item_error(err: FossologyError, upload: &Upload, item: u64, action: &str) -> FossologyError {
    if err.status_code() == Some(StatusCode::NOT_FOUND.as_u16()) {
        err.context(format!("Upload {} or item {item} not found", upload.id))
    } else {
        err.context(format!(
            "API error while {action} {item} from upload {}",
            upload.upload_name
        ))
    }
}
