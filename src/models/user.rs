//! User model and trait implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, RequestOptions};
use crate::error::Result;
use crate::models::common::Agents;
use crate::models::enums::{AccessLevel, UserAccessLevel};
use crate::traits::Get;

/// Name of the placeholder account every FOSSology instance ships with.
const DEFAULT_USER_NAME: &str = "Default User";

/// A FOSSology user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Only visible to administrators and the user itself.
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub access_level: UserAccessLevel,

    #[serde(default)]
    pub root_folder_id: u64,

    #[serde(default)]
    pub email_notification: Option<bool>,

    /// Agents scheduled by default for this user's uploads.
    #[serde(default)]
    pub agents: Option<Agents>,

    #[serde(default)]
    pub default_group: Option<u64>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "User {} ({}), {}, access level {} and root folder {}",
            self.description,
            self.id,
            self.email.as_deref().unwrap_or("-"),
            self.access_level,
            self.root_folder_id
        )
    }
}

/// Body for creating a user.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSpec {
    pub name: String,
    pub description: String,
    pub email: String,
    pub access_level: UserAccessLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_folder_id: Option<u64>,
    pub email_notification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_group: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agents: Option<Agents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_bucketpool: Option<u64>,
    #[serde(rename = "user_pass")]
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_visibility: Option<AccessLevel>,
}

impl User {
    /// Fetch the user the token belongs to.
    #[tracing::instrument(skip(client))]
    pub async fn current(client: &FossologyClient) -> Result<Self> {
        let response = client
            .get("users/self", RequestOptions::new())
            .await
            .map_err(|e| e.context("Error while getting details for the current user"))?;
        decode_json(response).await
    }

    /// List users, skipping the built-in default account and users whose
    /// email is not visible.
    #[tracing::instrument(skip(client))]
    pub async fn list(client: &FossologyClient) -> Result<Vec<Self>> {
        let response = client
            .get("users", RequestOptions::new())
            .await
            .map_err(|e| e.context(format!("Unable to get a list of users from {}", client.host())))?;
        let users: Vec<User> = decode_json(response).await?;

        Ok(users
            .into_iter()
            .filter(|u| u.name != DEFAULT_USER_NAME)
            .filter(|u| u.email.as_deref().is_some_and(|e| !e.is_empty()))
            .collect())
    }

    /// Create a user.
    ///
    /// Returns `false` if a user with that name already exists.
    #[tracing::instrument(skip(client, spec), fields(name = %spec.name))]
    pub async fn create(client: &FossologyClient, spec: &UserSpec) -> Result<bool> {
        match client.post("users", RequestOptions::new().json(spec)?).await {
            Ok(_) => {
                tracing::info!("User {} was created", spec.name);
                Ok(true)
            }
            Err(e) if e.status_code() == Some(StatusCode::CONFLICT.as_u16()) => {
                tracing::info!("User {} already exists", spec.name);
                Ok(false)
            }
            Err(e) => Err(e.context(format!("Error while creating user {}", spec.name))),
        }
    }

    /// Delete a user.
    #[tracing::instrument(skip(client))]
    pub async fn delete(client: &FossologyClient, id: u64) -> Result<()> {
        client
            .delete(&format!("users/{id}"), RequestOptions::new())
            .await
            .map_err(|e| e.context(format!("Error while deleting user {id}")))?;
        Ok(())
    }
}

#[async_trait]
impl Get for User {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &FossologyClient, id: u64) -> Result<Self> {
        let response = client
            .get(&format!("users/{id}"), RequestOptions::new())
            .await
            .map_err(|e| e.context(format!("Error while getting details for user {id}")))?;
        decode_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> Value {
        json!({
            "id": 3,
            "name": "fossy",
            "description": "super user",
            "email": "fossy@localhost",
            "accessLevel": "admin",
            "rootFolderId": 1,
            "emailNotification": true,
            "defaultGroup": 2,
            "agents": {"bucket": true, "nomos": true, "monk": false},
            "defaultBucketpool": null,
            "defaultVisibility": "public"
        })
    }

    #[test]
    fn test_user_deserialize() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        assert_eq!(user.id, 3);
        assert_eq!(user.access_level, UserAccessLevel::Admin);
        assert_eq!(user.root_folder_id, 1);
        assert!(user.agents.as_ref().unwrap().nomos);
        assert_eq!(user.additional_info.get("defaultVisibility"), Some(&json!("public")));
    }

    #[test]
    fn test_user_round_trip_keeps_unknown_fields() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["defaultVisibility"], json!("public"));
        assert_eq!(back["defaultBucketpool"], Value::Null);
        assert_eq!(back["rootFolderId"], json!(1));
    }

    #[test]
    fn test_user_minimal() {
        let user: User = serde_json::from_value(json!({"id": 1, "name": "Default User"})).unwrap();
        assert!(user.email.is_none());
        assert_eq!(user.access_level, UserAccessLevel::None);
    }

    #[test]
    fn test_user_spec_serialize() {
        let spec = UserSpec {
            name: "new".to_string(),
            email: "new@example.com".to_string(),
            access_level: UserAccessLevel::ReadWrite,
            password: "secret".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["accessLevel"], json!("read_write"));
        assert_eq!(value["user_pass"], json!("secret"));
        assert!(value.get("rootFolderId").is_none());
    }
}
