//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the
//! `foss_cli` binary, plus the selection helpers its commands share.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;

use crate::client::ApiVersion;
use crate::config::{DEFAULT_CONFIG_FILE_NAME, DEFAULT_SERVER_URL};
use crate::error::{FossologyError, Result};
use crate::models::{AccessLevel, Folder, Job, ReportFormat, TokenScope, Upload};

/// Default directory for downloaded reports.
pub const DEFAULT_RESULT_DIR: &str = ".foss_cli_results";

/// Description used for uploads when none is given.
pub const DEFAULT_UPLOAD_DESCRIPTION: &str = "Upload via foss-cli";

/// FOSSology command-line interface.
#[derive(Parser, Debug)]
#[command(name = "foss_cli", about = "FOSSology REST API CLI", version)]
pub struct Cli {
    /// API token, overrides FOSS_TOKEN and the config file.
    #[arg(long, short = 't', global = true)]
    pub token: Option<String>,

    /// Increase verbosity (-v info, -vv debug).
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Output results as JSON instead of text.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Show what would be done without changing anything on the server.
    #[arg(long, global = true, alias = "dry_run")]
    pub dry_run: bool,

    /// Directory where downloaded reports are written.
    #[arg(long, global = true, alias = "result_dir", default_value = DEFAULT_RESULT_DIR)]
    pub result_dir: PathBuf,

    /// Path of the config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE_NAME)]
    pub config_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update the config file with a freshly generated token.
    #[command(name = "config")]
    Config {
        /// URL of the FOSSology server.
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// Username on the server.
        #[arg(long, default_value = "fossy")]
        username: String,

        /// Password on the server.
        #[arg(long, default_value = "fossy")]
        password: String,

        /// Token scope (read or write).
        #[arg(long, alias = "token_scope", default_value_t = TokenScope::Read)]
        token_scope: TokenScope,

        /// API version to use.
        #[arg(long, alias = "api_version", default_value_t = ApiVersion::V1)]
        api_version: ApiVersion,

        /// Take the values from the options instead of prompting.
        #[arg(long = "no-interactive", alias = "nointeractive")]
        no_interactive: bool,
    },

    /// Create a group.
    #[command(name = "create_group")]
    CreateGroup {
        /// Name of the new group.
        group_name: String,
    },

    /// Create a folder below the root folder.
    #[command(name = "create_folder")]
    CreateFolder {
        /// Name of the new folder.
        folder_name: String,

        /// Description of the folder.
        #[arg(long, alias = "folder_description")]
        folder_description: Option<String>,

        /// Name of the group owning the folder.
        #[arg(long, alias = "folder_group")]
        folder_group: Option<String>,
    },

    /// Upload a file.
    #[command(name = "upload_file")]
    UploadFile {
        /// The file to upload.
        upload_file: PathBuf,

        /// Name of the upload folder (root folder if empty).
        #[arg(long, alias = "folder_name")]
        folder_name: Option<String>,

        /// Description of the upload.
        #[arg(long)]
        description: Option<String>,

        /// Access level of the upload.
        #[arg(long, alias = "access_level", default_value_t = AccessLevel::Public)]
        access_level: AccessLevel,

        /// Reuse the newest upload of this file if there is one.
        #[arg(long, alias = "reuse_newest_upload")]
        reuse_newest_upload: bool,

        /// Print the clearing summary of the upload.
        #[arg(long)]
        summary: bool,
    },

    /// Delete a folder by name.
    #[command(name = "delete_folder")]
    DeleteFolder {
        /// Name of the folder to delete.
        folder_name: String,
    },

    /// Delete an upload by name.
    #[command(name = "delete_upload")]
    DeleteUpload {
        /// Name of the upload to delete.
        upload_name: String,
    },

    /// Upload a file, scan it, and download a report.
    #[command(name = "start_workflow")]
    StartWorkflow {
        /// The file to process.
        file_name: PathBuf,

        /// Name of the upload folder (root folder if empty).
        #[arg(long, alias = "folder_name")]
        folder_name: Option<String>,

        /// Description of the upload.
        #[arg(long, alias = "file_description", default_value = DEFAULT_UPLOAD_DESCRIPTION)]
        file_description: String,

        /// Reuse the newest upload of this file if there is one.
        #[arg(long, alias = "reuse_newest_upload")]
        reuse_newest_upload: bool,

        /// Reuse the newest job of the upload if there is one.
        #[arg(long, alias = "reuse_newest_job")]
        reuse_newest_job: bool,

        /// Report format (defaults to the config file's, else unifiedreport).
        #[arg(long, alias = "report_format")]
        report_format: Option<ReportFormat>,

        /// Access level of a new upload.
        #[arg(long, alias = "access_level", default_value_t = AccessLevel::Protected)]
        access_level: AccessLevel,

        /// Seconds to wait for the scan jobs to finish.
        #[arg(long, default_value = "30")]
        wait: u64,
    },
}

/// Log level for the number of `-v` flags.
pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Pick the folder named `name` out of `folders`.
///
/// `None` means the caller should use the root folder. Names must match
/// exactly and only once.
///
/// # Errors
///
/// Returns [`FossologyError::NotFound`] when no folder has the name and
/// [`FossologyError::Unsupported`] when several do.
pub fn select_folder<'a>(folders: &'a [Folder], name: Option<&str>) -> Result<Option<&'a Folder>> {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        tracing::warn!("No folder name given, using the root folder");
        return Ok(None);
    };

    let mut matching = folders.iter().filter(|f| f.name == name);
    let found = matching.next().ok_or_else(|| FossologyError::NotFound {
        entity_type: "folder",
        id: name.to_string(),
    })?;
    if matching.next().is_some() {
        return Err(FossologyError::Unsupported(format!(
            "Multiple folders named '{name}' are not supported"
        )));
    }
    tracing::debug!("Found folder {} with id {}", name, found.id);
    Ok(Some(found))
}

/// The newest upload whose name the file path ends with.
pub fn newest_upload<'a>(uploads: &'a [Upload], file: &Path) -> Option<&'a Upload> {
    let file = file.to_string_lossy();
    uploads
        .iter()
        .filter(|u| !u.upload_name.is_empty() && file.ends_with(&u.upload_name))
        .max_by(|a, b| a.upload_date.cmp(&b.upload_date))
}

/// The most recently queued job.
pub fn newest_job(jobs: &[Job]) -> Option<&Job> {
    jobs.iter().max_by(|a, b| a.queue_date.cmp(&b.queue_date))
}

/// File name of `path`, used as the upload name on the server.
pub fn upload_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FossologyError::InvalidArgument(format!("{} is not a file", path.display())))
}
