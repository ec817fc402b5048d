//! Mock server state management.
//!
//! Provides the in-memory data store for the mock FOSSology server.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::fixtures::{Fixtures, DEFAULT_TOKEN};
use crate::{Folder, Group, Job, JobStatus, ReportFormat, Upload, User};

/// State shared between the handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// A report being generated.
#[derive(Debug, Clone)]
pub struct MockReport {
    pub upload_id: u64,
    pub format: ReportFormat,
    /// "Not ready" answers left before the report is served.
    pub pending: u32,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Result of asking for a report.
#[derive(Debug)]
pub enum ReportPoll {
    Missing,
    Pending,
    Ready(MockReport),
}

/// Shared state for the mock server.
///
/// Holds the user, folders, uploads, jobs and reports the server serves.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug)]
pub struct MockState {
    /// The user every valid token belongs to.
    pub user: User,

    /// Username to password, checked by the token endpoint.
    pub credentials: HashMap<String, String>,

    /// Tokens accepted on protected routes. Empty accepts anything.
    pub tokens: Vec<String>,

    pub folders: BTreeMap<u64, Folder>,
    pub groups: BTreeMap<u64, Group>,
    pub uploads: BTreeMap<u64, Upload>,
    pub jobs: BTreeMap<u64, Job>,
    pub reports: BTreeMap<u64, MockReport>,

    /// "Not ready" answers a new report gives before it is served.
    pub report_delay: u32,

    /// API version reported by `/info`.
    pub api_version: String,

    next_id: u64,
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

impl MockState {
    /// A fresh installation: user `fossy`, the root folder and nothing else.
    pub fn new() -> Self {
        let root = Fixtures::root_folder();
        let mut folders = BTreeMap::new();
        folders.insert(root.id, root);

        let mut groups = BTreeMap::new();
        groups.insert(1, Fixtures::group(1, "fossy"));

        Self {
            user: Fixtures::fossy(),
            credentials: HashMap::from([("fossy".to_string(), "fossy".to_string())]),
            tokens: vec![DEFAULT_TOKEN.to_string()],
            folders,
            groups,
            uploads: BTreeMap::new(),
            jobs: BTreeMap::new(),
            reports: BTreeMap::new(),
            report_delay: 0,
            api_version: "1.6.1".to_string(),
            next_id: 100,
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Add a folder to the state.
    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folders.insert(folder.id, folder);
        self
    }

    /// Add an upload to the state.
    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.uploads.insert(upload.id, upload);
        self
    }

    /// Add a job to the state.
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.insert(job.id, job);
        self
    }

    /// Make new reports answer "not ready" `count` times first.
    pub fn with_report_delay(mut self, count: u32) -> Self {
        self.report_delay = count;
        self
    }

    /// Report a different API version from `/info`.
    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Whether `token` may call protected routes.
    pub fn accepts(&self, token: &str) -> bool {
        self.tokens.is_empty() || self.tokens.iter().any(|t| t == token)
    }

    /// Issue a token for valid credentials.
    pub fn issue_token(&mut self, username: &str, password: &str, name: &str) -> Option<String> {
        if self.credentials.get(username).map(String::as_str) != Some(password) {
            return None;
        }
        let token = format!("{name}-{}", self.next_id());
        self.tokens.push(token.clone());
        Some(token)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Create a folder unless one with the same name exists under
    /// `parent`. Returns the folder id and whether it was created.
    pub fn create_folder(&mut self, parent: u64, name: &str, description: &str) -> (u64, bool) {
        if let Some(existing) = self.folders.values().find(|f| f.matches(name, parent)) {
            return (existing.id, false);
        }
        let id = self.next_id();
        let mut folder = Fixtures::folder(id, name, parent);
        folder.description = description.to_string();
        self.folders.insert(id, folder);
        (id, true)
    }

    /// Delete a folder and everything in it.
    pub fn delete_folder(&mut self, id: u64) -> bool {
        if self.folders.remove(&id).is_none() {
            return false;
        }
        self.uploads.retain(|_, u| u.folder_id != id);
        let children: Vec<u64> = self
            .folders
            .values()
            .filter(|f| f.parent == Some(id))
            .map(|f| f.id)
            .collect();
        for child in children {
            self.delete_folder(child);
        }
        true
    }

    /// Create a group. Returns `None` if the name is taken.
    pub fn create_group(&mut self, name: &str) -> Option<u64> {
        if self.groups.values().any(|g| g.name == name) {
            return None;
        }
        let id = self.next_id();
        self.groups.insert(id, Fixtures::group(id, name));
        Some(id)
    }

    /// Store a new upload in `folder`.
    pub fn create_upload(&mut self, folder: u64, name: &str, description: &str, size: u64) -> Option<u64> {
        let folder = self.folders.get(&folder)?.clone();
        let id = self.next_id();
        let date = format!("2024-01-01 12:00:00.{id:06}+00");
        let mut upload = Fixtures::upload(id, &folder, name, &date, size);
        upload.description = description.to_string();
        self.uploads.insert(id, upload);
        Some(id)
    }

    /// Uploads in `folder` (all uploads without a folder).
    pub fn list_uploads(&self, folder: Option<u64>) -> Vec<Upload> {
        self.uploads
            .values()
            .filter(|u| folder.map_or(true, |f| u.folder_id == f))
            .cloned()
            .collect()
    }

    /// Queue a job for an upload.
    pub fn schedule_job(&mut self, upload: u64) -> Option<u64> {
        if !self.uploads.contains_key(&upload) {
            return None;
        }
        let id = self.next_id();
        let date = format!("2024-02-01 12:00:00.{id:06}+00");
        self.jobs
            .insert(id, Fixtures::job(id, upload, &date, JobStatus::Queued));
        Some(id)
    }

    /// Return a job, moving it one step towards completion.
    pub fn advance_job(&mut self, id: u64) -> Option<Job> {
        let job = self.jobs.get_mut(&id)?;
        let current = job.clone();
        job.status = match job.status {
            JobStatus::Queued => JobStatus::Processing,
            JobStatus::Processing => JobStatus::Completed,
            ref other => other.clone(),
        };
        Some(current)
    }

    /// Jobs of one upload, or all jobs.
    pub fn list_jobs(&self, upload: Option<u64>) -> Vec<Job> {
        self.jobs
            .values()
            .filter(|j| upload.map_or(true, |u| j.upload_id == Some(u)))
            .cloned()
            .collect()
    }

    /// Start generating a report.
    pub fn create_report(&mut self, upload: u64, format: ReportFormat) -> Option<u64> {
        let name = self.uploads.get(&upload)?.upload_name.clone();
        let id = self.next_id();
        self.reports.insert(
            id,
            MockReport {
                upload_id: upload,
                format,
                pending: self.report_delay,
                filename: format!("{}_{}.txt", format.as_str(), name),
                content: format!("{format} report for {name}\n").into_bytes(),
            },
        );
        Some(id)
    }

    /// Ask for a report, counting down its pending answers.
    pub fn poll_report(&mut self, id: u64) -> ReportPoll {
        match self.reports.get_mut(&id) {
            None => ReportPoll::Missing,
            Some(report) if report.pending > 0 => {
                report.pending -= 1;
                ReportPoll::Pending
            }
            Some(report) => ReportPoll::Ready(report.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::fixtures::ROOT_FOLDER_ID;

    #[test]
    fn test_create_folder_is_idempotent() {
        let mut state = MockState::new();

        let (id, created) = state.create_folder(ROOT_FOLDER_ID, "Drivers", "");
        assert!(created);

        let (again, created) = state.create_folder(ROOT_FOLDER_ID, "drivers", "other");
        assert!(!created);
        assert_eq!(again, id);
    }

    #[test]
    fn test_job_progresses_on_each_read() {
        let mut state = MockState::new();
        let upload = state.create_upload(ROOT_FOLDER_ID, "a.zip", "", 10).unwrap();
        let job = state.schedule_job(upload).unwrap();

        let statuses: Vec<JobStatus> = (0..4)
            .map(|_| state.advance_job(job).unwrap().status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Queued,
                JobStatus::Processing,
                JobStatus::Completed,
                JobStatus::Completed
            ]
        );
    }

    #[test]
    fn test_report_pending_countdown() {
        let mut state = MockState::new().with_report_delay(2);
        let upload = state.create_upload(ROOT_FOLDER_ID, "a.zip", "", 10).unwrap();
        let report = state.create_report(upload, ReportFormat::Spdx2).unwrap();

        assert!(matches!(state.poll_report(report), ReportPoll::Pending));
        assert!(matches!(state.poll_report(report), ReportPoll::Pending));
        assert!(matches!(state.poll_report(report), ReportPoll::Ready(_)));
        assert!(matches!(state.poll_report(999), ReportPoll::Missing));
    }

    #[test]
    fn test_delete_folder_removes_uploads() {
        let mut state = MockState::new();
        let (folder, _) = state.create_folder(ROOT_FOLDER_ID, "Tmp", "");
        state.create_upload(folder, "a.zip", "", 10).unwrap();

        assert!(state.delete_folder(folder));
        assert!(state.list_uploads(None).is_empty());
        assert!(!state.delete_folder(folder));
    }

    #[test]
    fn test_issue_token_checks_password() {
        let mut state = MockState::new();
        assert!(state.issue_token("fossy", "wrong", "t").is_none());
        let token = state.issue_token("fossy", "fossy", "t").unwrap();
        assert!(state.accepts(&token));
    }
}
