//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::client::FossologyClient;
use crate::error::Result;

/// Update an existing entity.
///
/// Implement this trait for entity types that can be modified
/// after creation.
///
/// # Example
///
/// ```ignore
/// use fossology::{FossologyClient, Folder, FolderUpdate, Update};
///
/// let client = FossologyClient::from_env()?;
/// let updated = Folder::update(
///     &client,
///     12,
///     FolderUpdate {
///         name: Some("Renamed".to_string()),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this entity.
    type Id;

    /// Parameters for the update.
    type Params;

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &FossologyClient, id: Self::Id, params: Self::Params)
        -> Result<Self>;
}
