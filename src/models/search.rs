//! File search by name, license, copyright or hash.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::models::common::{Findings, Hash};
use crate::models::enums::SearchType;
use crate::models::upload::Upload;
use crate::pagination::{page_headers, read_page, Page};
use crate::traits::List;

/// One match of a file search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub upload: Upload,
    pub upload_tree_id: u64,
    pub filename: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Search criteria, sent as request headers.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub search_type: SearchType,
    /// Restrict the search to one upload.
    pub upload: Option<u64>,
    /// File name pattern, `%` is the wildcard.
    pub filename: Option<String>,
    pub tag: Option<String>,
    pub filesize_min: Option<u64>,
    pub filesize_max: Option<u64>,
    pub license: Option<String>,
    pub copyright: Option<String>,
    pub group: Option<String>,
}

/// A file known to the server, found by its hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub hash: Hash,
    #[serde(default)]
    pub findings: Option<Findings>,
    /// Ids of the uploads containing this file.
    #[serde(default)]
    pub uploads: Vec<u64>,
    /// Set by the server when the file is unknown.
    #[serde(default)]
    pub message: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl File {
    /// Look files up by hash.
    ///
    /// Unknown files are returned too, with `findings` unset and the
    /// server's explanation in `message`.
    #[tracing::instrument(skip(client, hashes), fields(count = hashes.len()))]
    pub async fn search(
        client: &FossologyClient,
        hashes: &[Hash],
        group: Option<&str>,
    ) -> Result<Vec<Self>> {
        let options = RequestOptions::new().group(group).json(hashes)?;
        let response = client.post("filesearch", options).await.map_err(|e| {
            if matches!(e, FossologyError::Authorization { .. }) {
                e.context("Not authorized to get a result with the given filesearch criteria")
            } else {
                e.context("Unable to get a result with the given filesearch criteria")
            }
        })?;
        decode_json(response).await
    }

    /// Whether the server knows this file.
    pub fn is_known(&self) -> bool {
        self.findings.is_some()
    }
}

#[async_trait]
impl List for SearchResult {
    type Query = SearchQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &FossologyClient,
        query: &Self::Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        let options = RequestOptions::new()
            .header("searchType", query.search_type)
            .header_opt("uploadId", query.upload)
            .header_opt("filename", query.filename.as_deref())
            .header_opt("tag", query.tag.as_deref())
            .header_opt("filesizemin", query.filesize_min)
            .header_opt("filesizemax", query.filesize_max)
            .header_opt("license", query.license.as_deref())
            .header_opt("copyright", query.copyright.as_deref())
            .group(query.group.as_deref());

        let response = client
            .get("search", page_headers(options, page, page_size))
            .await
            .map_err(|e| e.context("Unable to get a result with the given search criteria"))?;
        read_page(response, page, page_size).await
    }
}
