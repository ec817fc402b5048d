//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde_json::Map;

use crate::{
    ClearingStatus, Folder, Group, Hash, Job, JobStatus, Summary, Upload, User, UserAccessLevel,
};

/// Id of the root folder in the default scenario.
pub const ROOT_FOLDER_ID: u64 = 1;

/// Name FOSSology gives the root folder.
pub const ROOT_FOLDER_NAME: &str = "Software Repository";

/// Token accepted by the default scenario.
pub const DEFAULT_TOKEN: &str = "mock-token";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // User Fixtures
    // =========================================================================

    /// The administrator account of a fresh installation.
    pub fn fossy() -> User {
        User {
            id: 3,
            name: "fossy".to_string(),
            description: "Default Administrator".to_string(),
            email: Some("fossy@localhost".to_string()),
            access_level: UserAccessLevel::Admin,
            root_folder_id: ROOT_FOLDER_ID,
            email_notification: Some(true),
            agents: None,
            default_group: Some(1),
            additional_info: Map::new(),
        }
    }

    // =========================================================================
    // Folder / Group Fixtures
    // =========================================================================

    /// The root folder.
    pub fn root_folder() -> Folder {
        Folder {
            id: ROOT_FOLDER_ID,
            name: ROOT_FOLDER_NAME.to_string(),
            description: "Top Folder".to_string(),
            parent: None,
            additional_info: Map::new(),
        }
    }

    /// A folder below `parent`.
    pub fn folder(id: u64, name: &str, parent: u64) -> Folder {
        Folder {
            id,
            name: name.to_string(),
            description: String::new(),
            parent: Some(parent),
            additional_info: Map::new(),
        }
    }

    /// A group.
    pub fn group(id: u64, name: &str) -> Group {
        Group {
            id,
            name: name.to_string(),
            additional_info: Map::new(),
        }
    }

    // =========================================================================
    // Upload / Job Fixtures
    // =========================================================================

    /// An upload of `name` in `folder`.
    pub fn upload(id: u64, folder: &Folder, name: &str, upload_date: &str, size: u64) -> Upload {
        Upload {
            folder_id: folder.id,
            folder_name: folder.name.clone(),
            id,
            description: String::new(),
            upload_name: name.to_string(),
            upload_date: upload_date.to_string(),
            assignee: None,
            file_size: None,
            hash: Some(Hash {
                sha1: Some(format!("{:040x}", id)),
                md5: Some(format!("{:032x}", id)),
                sha256: Some(format!("{:064x}", id)),
                size: Some(size),
                additional_info: Map::new(),
            }),
            additional_info: Map::new(),
        }
    }

    /// A job for `upload` in the given state.
    pub fn job(id: u64, upload: u64, queue_date: &str, status: JobStatus) -> Job {
        Job {
            id,
            name: format!("upload {upload}"),
            queue_date: queue_date.to_string(),
            upload_id: Some(upload),
            user_id: Some(3),
            group_id: Some(1),
            eta: Some(0),
            status,
            additional_info: Map::new(),
        }
    }

    /// Clearing summary of a freshly scanned upload.
    pub fn summary(upload: &Upload) -> Summary {
        Summary {
            id: upload.id,
            upload_name: upload.upload_name.clone(),
            main_license: Some("MIT".to_string()),
            unique_licenses: 2,
            total_licenses: 5,
            unique_concluded_licenses: 0,
            total_concluded_licenses: 0,
            files_to_be_cleared: 5,
            files_cleared: 0,
            clearing_status: Some(ClearingStatus::Open),
            copyright_count: 3,
            additional_info: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_fixture_size() {
        let upload = Fixtures::upload(2, &Fixtures::root_folder(), "a.tar.gz", "2024-01-01", 42);
        assert_eq!(upload.size(), Some(42));
        assert_eq!(upload.folder_name, ROOT_FOLDER_NAME);
    }
}
