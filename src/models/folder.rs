//! Folder model and trait implementations.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{decode_json, FossologyClient, Info, RequestOptions};
use crate::error::{FossologyError, Result};
use crate::traits::{Get, Update};

/// A FOSSology folder.
///
/// Folders form a tree below the user's root folder. Names are unique
/// per parent, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Parent folder id, `None` for the root folder.
    #[serde(default)]
    pub parent: Option<u64>,

    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl std::fmt::Display for Folder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}), '{}'", self.name, self.id, self.description)?;
        if let Some(parent) = self.parent {
            write!(f, ", parent folder id = {parent}")?;
        }
        Ok(())
    }
}

/// Parameters for renaming or re-describing a folder.
#[derive(Debug, Clone, Default)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Whether a folder is moved or copied by [`Folder::move_to`] / [`Folder::copy_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FolderAction {
    Move,
    Copy,
}

impl FolderAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
        }
    }
}

impl Folder {
    /// Whether this folder would collide with `name` under `parent`.
    ///
    /// Descriptions are ignored.
    pub fn matches(&self, name: &str, parent: u64) -> bool {
        self.parent == Some(parent) && self.name.to_lowercase() == name.to_lowercase()
    }

    /// Whether this is a root folder.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// List the folders accessible to the user, optionally in a group.
    #[tracing::instrument(skip(client))]
    pub async fn list(client: &FossologyClient, group: Option<&str>) -> Result<Vec<Self>> {
        let response = client
            .get("folders", RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context("Unable to get a list of folders"))?;
        let folders: Vec<Folder> = decode_json(response).await?;
        tracing::debug!("{} folders are accessible", folders.len());
        Ok(folders)
    }

    /// Fetch a folder, optionally in a group.
    #[tracing::instrument(skip(client))]
    pub async fn detail(client: &FossologyClient, id: u64, group: Option<&str>) -> Result<Self> {
        let response = client
            .get(&format!("folders/{id}"), RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context(format!("Error while getting details for folder {id}")))?;
        decode_json(response).await
    }

    /// Create a folder below `parent`.
    ///
    /// If a folder with the same name (case-insensitive) already exists
    /// under `parent`, that folder is returned and nothing is created.
    #[tracing::instrument(skip(client, description))]
    pub async fn create(
        client: &FossologyClient,
        parent: u64,
        name: &str,
        description: Option<&str>,
        group: Option<&str>,
    ) -> Result<Self> {
        let options = RequestOptions::new()
            .header("parentFolder", parent)
            .header("folderName", name)
            .header_opt("folderDescription", description)
            .group(group);

        let response = client.post("folders", options).await.map_err(|e| {
            if !matches!(e, FossologyError::Authorization { .. }) {
                return e.context(format!("Unable to create folder {name} under {parent}"));
            }
            match group {
                Some(g) => e.context(format!(
                    "Folder creation for group {g} in folder {parent} not authorized"
                )),
                None => e.context(format!("Folder creation in folder {parent} not authorized")),
            }
        })?;

        if response.status() == StatusCode::CREATED {
            let info: Info = decode_json(response).await?;
            let id = info.id().ok_or_else(|| FossologyError::ApiError {
                message: format!("Folder {name} created but no id returned: {}", info.text()),
                status_code: Some(StatusCode::CREATED.as_u16()),
            })?;
            tracing::info!("Folder {} has been created", name);
            return Self::detail(client, id, group).await;
        }

        tracing::info!("Folder '{}' already exists", name);
        Self::list(client, group)
            .await?
            .into_iter()
            .find(|f| f.matches(name, parent))
            .ok_or_else(|| FossologyError::NotFound {
                entity_type: "folder",
                id: format!("{name} (under folder {parent})"),
            })
    }

    /// Delete a folder. The server schedules the deletion.
    #[tracing::instrument(skip(client))]
    pub async fn delete(client: &FossologyClient, id: u64, group: Option<&str>) -> Result<()> {
        client
            .delete(&format!("folders/{id}"), RequestOptions::new().group(group))
            .await
            .map_err(|e| e.context(format!("Unable to delete folder {id}")))?;
        tracing::info!("Folder {} has been scheduled for deletion", id);
        Ok(())
    }

    /// Move a folder below another parent.
    pub async fn move_to(
        client: &FossologyClient,
        id: u64,
        parent: u64,
        group: Option<&str>,
    ) -> Result<()> {
        Self::put(client, FolderAction::Move, id, parent, group).await
    }

    /// Copy a folder below another parent.
    pub async fn copy_to(
        client: &FossologyClient,
        id: u64,
        parent: u64,
        group: Option<&str>,
    ) -> Result<()> {
        Self::put(client, FolderAction::Copy, id, parent, group).await
    }

    #[tracing::instrument(skip(client))]
    async fn put(
        client: &FossologyClient,
        action: FolderAction,
        id: u64,
        parent: u64,
        group: Option<&str>,
    ) -> Result<()> {
        let options = RequestOptions::new()
            .header("parent", parent)
            .header("action", action.as_str())
            .group(group);

        client
            .put(&format!("folders/{id}"), options)
            .await
            .map_err(|e| {
                e.context(format!(
                    "Unable to {} folder {id} to {parent}",
                    action.as_str()
                ))
            })?;
        tracing::info!("Folder {} has been {}d to {}", id, action.as_str(), parent);
        Ok(())
    }
}

#[async_trait]
impl Get for Folder {
    type Id = u64;

    async fn get(client: &FossologyClient, id: u64) -> Result<Self> {
        Self::detail(client, id, None).await
    }
}

#[async_trait]
impl Update for Folder {
    type Id = u64;
    type Params = FolderUpdate;

    #[tracing::instrument(skip(client))]
    async fn update(client: &FossologyClient, id: u64, params: FolderUpdate) -> Result<Self> {
        let options = RequestOptions::new()
            .header_opt("name", params.name.as_deref())
            .header_opt("description", params.description.as_deref());

        client
            .patch(&format!("folders/{id}"), options)
            .await
            .map_err(|e| e.context(format!("Unable to update folder {id}")))?;
        Self::detail(client, id, None).await
    }
}
