//! License model and trait implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::Result;
use crate::models::enums::LicenseType;
use crate::pagination::{page_headers, read_page, Page};
use crate::traits::{List, Update};

/// License endpoints appeared in API 1.3.0.
const LICENSES_SINCE: Version = Version::new(1, 3, 0);

/// An obligation attached to a license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: u64,
    #[serde(default)]
    pub topic: String,
    #[serde(rename = "type", default)]
    pub obligation_type: String,
    #[serde(default)]
    pub text: String,
    /// `green`, `white`, `yellow` or `red`.
    #[serde(default)]
    pub classification: String,
    #[serde(default)]
    pub comment: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// A license known to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(default)]
    pub id: Option<u64>,
    pub short_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub risk: Option<u32>,
    #[serde(default)]
    pub is_candidate: bool,
    #[serde(default)]
    pub obligations: Vec<Obligation>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Filters for listing licenses.
#[derive(Debug, Clone, Default)]
pub struct LicenseListQuery {
    /// Only active (or only inactive) licenses.
    pub active: Option<bool>,
    pub kind: Option<LicenseType>,
    pub group: Option<String>,
}

/// Changes to an existing license.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<u32>,
}

impl License {
    /// Build a candidate license to submit with [`License::add`].
    pub fn new(short_name: &str, full_name: &str, text: &str) -> Self {
        Self {
            id: None,
            short_name: short_name.to_string(),
            full_name: full_name.to_string(),
            text: text.to_string(),
            url: String::new(),
            risk: None,
            is_candidate: true,
            obligations: Vec::new(),
            additional_info: Map::new(),
        }
    }

    /// Fetch a license by short name.
    #[tracing::instrument(skip(client))]
    pub async fn detail(
        client: &FossologyClient,
        short_name: &str,
        group: Option<&str>,
    ) -> Result<Self> {
        client.require_version("/license", &LICENSES_SINCE)?;
        let path = format!("license/{}", urlencoding::encode(short_name));
        let response = client
            .get(&path, RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context(format!("Unable to get license {short_name}")))?;
        decode_json(response).await
    }

    /// Add a license.
    ///
    /// Returns `false` if a license with that short name already exists.
    #[tracing::instrument(skip(client, license), fields(short_name = %license.short_name))]
    pub async fn add(
        client: &FossologyClient,
        license: &License,
        merge_request: bool,
    ) -> Result<bool> {
        client.require_version("/license", &LICENSES_SINCE)?;

        let mut body = serde_json::to_value(license)?;
        if let Value::Object(map) = &mut body {
            map.insert("mergeRequest".to_string(), Value::Bool(merge_request));
        }

        match client.post("license", RequestOptions::new().json(&body)?).await {
            Ok(_) => {
                tracing::info!("License {} has been added", license.short_name);
                Ok(true)
            }
            Err(e) if e.status_code() == Some(StatusCode::CONFLICT.as_u16()) => {
                tracing::info!("License {} already exists", license.short_name);
                Ok(false)
            }
            Err(e) => Err(e.context(format!("Error while adding license {}", license.short_name))),
        }
    }
}

#[async_trait]
impl List for License {
    type Query = LicenseListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &FossologyClient,
        query: &Self::Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self>> {
        client.require_version("/license", &LICENSES_SINCE)?;
        let options = RequestOptions::new()
            .query_opt("active", query.active)
            .query_opt("kind", query.kind)
            .group(query.group.as_deref());

        let response = client
            .get("license", page_headers(options, page, page_size))
            .await
            .map_err(|e| e.context("Unable to retrieve the list of licenses"))?;
        read_page(response, page, page_size).await
    }
}

#[async_trait]
impl Update for License {
    type Id = String;
    type Params = LicenseUpdate;

    #[tracing::instrument(skip(client))]
    async fn update(client: &FossologyClient, short_name: String, params: LicenseUpdate) -> Result<Self> {
        client.require_version("/license", &LICENSES_SINCE)?;
        let path = format!("license/{}", urlencoding::encode(&short_name));
        client
            .patch(&path, RequestOptions::new().json(&params)?)
            .await
            .map_err(|e| e.context(format!("Unable to update license {short_name}")))?;
        Self::detail(client, &short_name, None).await
    }
}
