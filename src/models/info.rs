//! Server information and health.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::Result;

/// License of the API itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiLicense {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Build information of the FOSSology installation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FossologyBuild {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub branch_name: String,
    #[serde(default)]
    pub commit_hash: String,
    #[serde(default)]
    pub commit_date: String,
    #[serde(default)]
    pub build_date: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Payload of `GET /info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// REST API version, e.g. `1.4.3`.
    pub version: String,
    #[serde(default)]
    pub security: Vec<Value>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub license: ApiLicense,
    #[serde(default)]
    pub fossology: Option<FossologyBuild>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl ApiInfo {
    #[tracing::instrument(skip(client))]
    pub async fn get(client: &FossologyClient) -> Result<Self> {
        let response = client
            .get("info", RequestOptions::new())
            .await
            .map_err(|e| e.context("Error while getting API info"))?;
        decode_json(response).await
    }
}

/// Status of one server component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStatus {
    #[serde(default)]
    pub status: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub status: String,
    #[serde(default)]
    pub scheduler: ComponentStatus,
    #[serde(default)]
    pub db: ComponentStatus,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl HealthInfo {
    #[tracing::instrument(skip(client))]
    pub async fn get(client: &FossologyClient) -> Result<Self> {
        let response = client
            .get("health", RequestOptions::new())
            .await
            .map_err(|e| e.context("Error while getting health info"))?;
        decode_json(response).await
    }

    /// Whether every component reports `OK`.
    pub fn is_healthy(&self) -> bool {
        [&self.status, &self.scheduler.status, &self.db.status]
            .iter()
            .all(|s| s.eq_ignore_ascii_case("ok"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_info_deserialize() {
        let info: ApiInfo = serde_json::from_value(json!({
            "name": "FOSSology API",
            "description": "Automate your fossology instance using REST API",
            "version": "1.4.3",
            "security": [],
            "contact": "fossology@fossology.org",
            "license": {"name": "GPL-2.0-only", "url": "https://www.gnu.org/licenses/old-licenses/gpl-2.0.html"},
            "fossology": {"version": "4.1.0", "branchName": "master", "commitHash": "abc", "commitDate": "", "buildDate": ""}
        }))
        .unwrap();
        assert_eq!(info.version, "1.4.3");
        assert_eq!(info.fossology.unwrap().version, "4.1.0");
    }

    #[test]
    fn test_health() {
        let health: HealthInfo = serde_json::from_value(json!({
            "status": "OK",
            "scheduler": {"status": "OK"},
            "db": {"status": "ERROR"}
        }))
        .unwrap();
        assert!(!health.is_healthy());
    }

    #[test]
    fn test_nested_records_keep_unknown_keys() {
        let info: ApiInfo = serde_json::from_value(json!({
            "version": "1.6.1",
            "license": {"name": "GPL-2.0-only", "url": "", "spdx": "GPL-2.0-only"},
            "fossology": {"version": "4.4.0", "buildNumber": 12}
        }))
        .unwrap();
        assert_eq!(info.license.additional_info["spdx"], json!("GPL-2.0-only"));
        assert_eq!(info.fossology.unwrap().additional_info["buildNumber"], json!(12));

        let health: HealthInfo = serde_json::from_value(json!({
            "status": "OK",
            "scheduler": {"status": "OK", "message": "running"},
            "db": {"status": "OK"}
        }))
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.scheduler.additional_info["message"], json!("running"));
    }
}
