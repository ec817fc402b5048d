//! Group model.

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::Result;

/// Groups endpoints appeared in API 1.2.1.
const GROUPS_SINCE: Version = Version::new(1, 2, 1);

/// A FOSSology group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl Group {
    /// List groups: the user's groups, or all groups for an administrator.
    #[tracing::instrument(skip(client))]
    pub async fn list(client: &FossologyClient) -> Result<Vec<Self>> {
        client.require_version("/groups", &GROUPS_SINCE)?;
        let response = client
            .get("groups", RequestOptions::new())
            .await
            .map_err(|e| e.context("Unable to get a list of groups"))?;
        decode_json(response).await
    }

    /// Create a group.
    #[tracing::instrument(skip(client))]
    pub async fn create(client: &FossologyClient, name: &str) -> Result<()> {
        client.require_version("/groups", &GROUPS_SINCE)?;
        client
            .post("groups", RequestOptions::new().header("name", name))
            .await
            .map_err(|e| {
                e.context(format!(
                    "Group {name} already exists, failed to create group or no group name provided"
                ))
            })?;
        tracing::info!("Group '{}' has been added", name);
        Ok(())
    }

    /// Find a group by name (case-insensitive).
    pub async fn find(client: &FossologyClient, name: &str) -> Result<Option<Self>> {
        Ok(Self::list(client)
            .await?
            .into_iter()
            .find(|g| g.name.eq_ignore_ascii_case(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_round_trip() {
        let input = json!({"id": 2, "name": "fossy", "members": []});
        let group: Group = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(group.name, "fossy");
        assert_eq!(serde_json::to_value(&group).unwrap(), input);
    }
}
