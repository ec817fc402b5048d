//! FOSSology CLI binary.
//!
//! A command-line interface for uploading files to a FOSSology server,
//! scanning them and downloading reports.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use dialoguer::{Input, Password, Select};
use fossology::cli::{
    log_level, newest_job, newest_upload, select_folder, upload_name, Cli, Command,
    DEFAULT_UPLOAD_DESCRIPTION,
};
use fossology::config::CliConfig;
use fossology::output::PrettyPrint;
use fossology::{
    obtain_token, AccessLevel, ApiVersion, Folder, FossologyClient, FossologyError, Group, Job,
    JobListQuery, JobSpec, JobStatus, List, PageRequest, Report, ReportFormat, TokenRequest, TokenScope,
    Upload, UploadListQuery, UploadOptions, UploadSource,
};
use serde::Serialize;
use tabled::{Table, Tabled};

/// How long a fresh upload may take to unpack before its details are read.
const UPLOAD_WAIT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(log_level(cli.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs besides its own arguments.
struct Context {
    client: FossologyClient,
    config: CliConfig,
    json: bool,
    dry_run: bool,
}

impl Context {
    fn group(&self) -> Option<&str> {
        self.config.fossology.default_group.as_deref()
    }

    fn root_folder(&self) -> fossology::Result<u64> {
        self.client
            .user()
            .map(|u| u.root_folder_id)
            .ok_or_else(|| FossologyError::ConfigMissing("no authenticated user".to_string()))
    }

    /// Resolve the folder to work in; `None` or an empty name means root.
    async fn folder_id(&self, name: Option<&str>) -> fossology::Result<u64> {
        let name = name.or(self.config.fossology.default_folder.as_deref());
        let folders = Folder::list(&self.client, self.group()).await?;
        match select_folder(&folders, name)? {
            Some(folder) => Ok(folder.id),
            None => self.root_folder(),
        }
    }
}

async fn run(cli: Cli) -> fossology::Result<()> {
    if let Command::Config {
        server,
        username,
        password,
        token_scope,
        api_version,
        no_interactive,
    } = cli.command
    {
        return handle_config(
            &cli.config_file,
            server,
            username,
            password,
            token_scope,
            api_version,
            !no_interactive,
        )
        .await;
    }

    let config = CliConfig::load(&cli.config_file).await?.unwrap_or_else(|| {
        tracing::debug!("No config file found at {}", cli.config_file.display());
        CliConfig::default()
    });

    let env_token = std::env::var("FOSS_TOKEN").ok();
    let token = config
        .resolve_token(cli.token.as_deref(), env_token.as_deref())
        .ok_or_else(|| {
            FossologyError::ConfigMissing(
                "No token provided. Run 'foss_cli config', set FOSS_TOKEN or use --token"
                    .to_string(),
            )
        })?;

    let version = config.fossology.api_version()?;
    let client = FossologyClient::connect(&config.fossology.server_url, &token, version).await?;
    if let Some(user) = client.user() {
        tracing::debug!("Logged in as user {} on {}", user.name, client.host());
    }

    let ctx = Context {
        client,
        config,
        json: cli.json,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Command::Config { .. } => Ok(()),
        Command::CreateGroup { group_name } => handle_create_group(&ctx, &group_name).await,
        Command::CreateFolder {
            folder_name,
            folder_description,
            folder_group,
        } => {
            handle_create_folder(
                &ctx,
                &folder_name,
                folder_description.as_deref(),
                folder_group.as_deref(),
            )
            .await
        }
        Command::UploadFile {
            upload_file,
            folder_name,
            description,
            access_level,
            reuse_newest_upload,
            summary,
        } => {
            handle_upload_file(
                &ctx,
                &upload_file,
                folder_name.as_deref(),
                description,
                access_level,
                reuse_newest_upload,
                summary,
            )
            .await
        }
        Command::DeleteFolder { folder_name } => handle_delete_folder(&ctx, &folder_name).await,
        Command::DeleteUpload { upload_name } => handle_delete_upload(&ctx, &upload_name).await,
        Command::StartWorkflow {
            file_name,
            folder_name,
            file_description,
            reuse_newest_upload,
            reuse_newest_job,
            report_format,
            access_level,
            wait,
        } => {
            let workflow = Workflow {
                file: &file_name,
                folder_name: folder_name.as_deref(),
                description: file_description,
                reuse_newest_upload,
                reuse_newest_job,
                report_format: report_format
                    .or(ctx.config.fossology.report_format)
                    .unwrap_or(ReportFormat::UnifiedReport),
                access_level,
                wait: Duration::from_secs(wait),
            };
            handle_start_workflow(&ctx, workflow, &cli.result_dir).await
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> FossologyError {
    FossologyError::Io(std::io::Error::other(e))
}

async fn handle_config(
    path: &Path,
    mut server: String,
    mut username: String,
    mut password: String,
    mut token_scope: TokenScope,
    api_version: ApiVersion,
    interactive: bool,
) -> fossology::Result<()> {
    if interactive {
        server = Input::<String>::new()
            .with_prompt("FOSSology URL (e.g. http://fossology/repo)")
            .default(server)
            .interact_text()
            .map_err(prompt_error)?;
        username = Input::<String>::new()
            .with_prompt("Username")
            .default(username)
            .interact_text()
            .map_err(prompt_error)?;
        password = Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(prompt_error)?;
        let scopes: Vec<&str> = TokenScope::ALL.iter().map(|s| s.as_str()).collect();
        let selected = Select::new()
            .with_prompt("Token scope")
            .items(&scopes[..])
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        token_scope = TokenScope::ALL[selected];
    }

    tracing::warn!(
        "Create a new config for {} on {} with scope {}",
        username,
        server,
        token_scope
    );

    let mut request = TokenRequest::new(&username, &password, token_scope);
    request.version = api_version;
    let token = obtain_token(&server, &request).await?;
    tracing::debug!("Token {} has been created", request.token_name);

    let mut config = match CliConfig::load(path).await? {
        Some(existing) => {
            tracing::info!("Found existing config file {}, updating the values", path.display());
            existing
        }
        None => {
            tracing::info!("Config file {} not found, creating a new one", path.display());
            CliConfig::default()
        }
    };
    config.fossology.server_url = server;
    config.fossology.username = username;
    config.fossology.token = token;
    config.fossology.api_version = api_version.to_string();
    config.save(path).await?;

    tracing::warn!("New config has been written to {}", path.display());
    Ok(())
}

async fn handle_create_group(ctx: &Context, name: &str) -> fossology::Result<()> {
    if ctx.dry_run {
        tracing::warn!("Dry run: would create group {}", name);
        return Ok(());
    }

    if let Some(existing) = Group::find(&ctx.client, name).await? {
        tracing::info!("Group {} already exists", name);
        return output_single(&existing, ctx.json);
    }

    Group::create(&ctx.client, name).await?;
    match Group::find(&ctx.client, name).await? {
        Some(group) => output_single(&group, ctx.json),
        None => Ok(()),
    }
}

async fn handle_create_folder(
    ctx: &Context,
    name: &str,
    description: Option<&str>,
    group: Option<&str>,
) -> fossology::Result<()> {
    let group = group.or(ctx.group());
    let root = ctx.root_folder()?;
    if ctx.dry_run {
        tracing::warn!("Dry run: would create folder {} in folder {}", name, root);
        return Ok(());
    }

    let folder = Folder::create(&ctx.client, root, name, description, group).await?;
    tracing::debug!("Folder {} with description '{}' created", folder.name, folder.description);
    output_single(&folder, ctx.json)
}

/// Reuse the newest upload of `file` in `folder`, if any.
async fn find_newest_upload(ctx: &Context, file: &Path, folder: u64) -> fossology::Result<Option<Upload>> {
    let query = UploadListQuery {
        folder: Some(folder),
        group: ctx.group().map(str::to_string),
        ..Default::default()
    };
    let uploads = Upload::list(&ctx.client, &query, PageRequest::all()).await?;
    let Some(found) = newest_upload(&uploads.items, file) else {
        return Ok(None);
    };
    tracing::info!("Can reuse upload {} ({})", found.upload_name, found.id);
    Upload::detail(&ctx.client, found.id, ctx.group(), None)
        .await
        .map(Some)
}

async fn new_upload(
    ctx: &Context,
    file: &Path,
    folder: u64,
    description: String,
    access_level: AccessLevel,
) -> fossology::Result<Upload> {
    let options = UploadOptions {
        description: Some(description),
        access_level: Some(access_level),
        group: ctx.group().map(str::to_string),
        wait: Some(UPLOAD_WAIT),
        ..Default::default()
    };
    Upload::create(&ctx.client, folder, UploadSource::File(file.to_path_buf()), options).await
}

async fn handle_upload_file(
    ctx: &Context,
    file: &Path,
    folder_name: Option<&str>,
    description: Option<String>,
    access_level: AccessLevel,
    reuse_newest_upload: bool,
    summary: bool,
) -> fossology::Result<()> {
    let name = upload_name(file)?;
    let folder = ctx.folder_id(folder_name).await?;

    let mut upload = None;
    if reuse_newest_upload {
        upload = find_newest_upload(ctx, file, folder).await?;
    }

    let upload = match upload {
        Some(upload) => upload,
        None if ctx.dry_run => {
            tracing::warn!("Dry run: would upload {} to folder {}", name, folder);
            return Ok(());
        }
        None => {
            let description = description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_UPLOAD_DESCRIPTION.to_string());
            new_upload(ctx, file, folder, description, access_level).await?
        }
    };
    output_single(&upload, ctx.json)?;

    if summary {
        let summary = Upload::summary(&ctx.client, upload.id, ctx.group()).await?;
        output_single(&summary, ctx.json)?;
    }
    Ok(())
}

async fn handle_delete_folder(ctx: &Context, name: &str) -> fossology::Result<()> {
    let folders = Folder::list(&ctx.client, ctx.group()).await?;
    let folder = folders
        .iter()
        .find(|f| f.name == name)
        .ok_or_else(|| FossologyError::NotFound {
            entity_type: "folder",
            id: name.to_string(),
        })?;
    tracing::debug!("Found folder to delete: {}", folder);

    if ctx.dry_run {
        tracing::warn!("Dry run: would delete folder {}", folder);
        return Ok(());
    }
    Folder::delete(&ctx.client, folder.id, ctx.group()).await?;
    tracing::info!("Deletion of folder {} requested on {}", folder.name, ctx.client.host());
    Ok(())
}

async fn handle_delete_upload(ctx: &Context, name: &str) -> fossology::Result<()> {
    let query = UploadListQuery {
        group: ctx.group().map(str::to_string),
        ..Default::default()
    };
    let uploads = Upload::list(&ctx.client, &query, PageRequest::all()).await?;
    let upload = uploads
        .iter()
        .find(|u| u.upload_name == name)
        .ok_or_else(|| FossologyError::NotFound {
            entity_type: "upload",
            id: name.to_string(),
        })?;
    tracing::debug!("Found upload to delete: {}", upload);

    if ctx.dry_run {
        tracing::warn!("Dry run: would delete upload {}", upload);
        return Ok(());
    }
    Upload::delete(&ctx.client, upload.id, ctx.group()).await?;
    tracing::info!("Deletion of upload {} requested on {}", upload.upload_name, ctx.client.host());
    Ok(())
}

struct Workflow<'a> {
    file: &'a Path,
    folder_name: Option<&'a str>,
    description: String,
    reuse_newest_upload: bool,
    reuse_newest_job: bool,
    report_format: ReportFormat,
    access_level: AccessLevel,
    wait: Duration,
}

async fn handle_start_workflow(
    ctx: &Context,
    workflow: Workflow<'_>,
    result_dir: &Path,
) -> fossology::Result<()> {
    let name = upload_name(workflow.file)?;
    let folder = ctx.folder_id(workflow.folder_name).await?;
    let group = ctx.group();

    let upload = if workflow.reuse_newest_upload {
        find_newest_upload(ctx, workflow.file, folder).await?
    } else if ctx.dry_run {
        tracing::warn!("Skip upload as dry run is requested without --reuse-newest-upload");
        None
    } else {
        tracing::debug!("Initiate new upload for {}", name);
        Some(new_upload(ctx, workflow.file, folder, workflow.description, workflow.access_level).await?)
    };
    let upload = upload.ok_or_else(|| FossologyError::NotFound {
        entity_type: "upload",
        id: name.clone(),
    })?;

    let mut job = None;
    if workflow.reuse_newest_job {
        let query = JobListQuery {
            upload: Some(upload.id),
            group: group.map(str::to_string),
            ..Default::default()
        };
        let jobs = Job::list(&ctx.client, &query, PageRequest::all()).await?;
        match newest_job(&jobs.items) {
            Some(newest) => {
                tracing::debug!("Reusing job {} queued on {}", newest.id, newest.queue_date);
                job = Some(Job::detail(&ctx.client, newest.id, Some(workflow.wait)).await?);
            }
            None => tracing::info!("Upload {} never started a job", upload.upload_name),
        }
    }

    let job = match job {
        Some(job) => job,
        None if ctx.dry_run => {
            tracing::warn!("Dry run: would schedule jobs for upload {}", upload.id);
            return Ok(());
        }
        None => {
            Job::schedule(
                &ctx.client,
                folder,
                upload.id,
                &JobSpec::full_scan(),
                group,
                Some(workflow.wait),
            )
            .await?
        }
    };

    tracing::debug!("Job {} is in state {}", job.id, job.status);
    if job.status != JobStatus::Completed {
        return Err(FossologyError::ApiError {
            message: format!(
                "Job {} is in state {}; try again later with --reuse-newest-upload --reuse-newest-job",
                job.id, job.status
            ),
            status_code: None,
        });
    }

    if ctx.dry_run {
        tracing::warn!(
            "Dry run: would generate a {} report for upload {}",
            workflow.report_format,
            upload.id
        );
        return Ok(());
    }

    let report = Report::generate(&ctx.client, upload.id, workflow.report_format, group).await?;
    let download = Report::download(&ctx.client, report, group, Some(workflow.wait)).await?;

    tokio::fs::create_dir_all(result_dir).await?;
    // Never let a server-chosen name escape the result directory.
    let file_name = Path::new(&download.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("report_{report}").into());
    let destination = result_dir.join(file_name);
    tokio::fs::write(&destination, &download.content).await?;
    tracing::info!(
        "Report {} written to {} ({} bytes)",
        download.filename,
        destination.display(),
        download.content.len()
    );

    let row = WorkflowRow {
        upload: upload.id,
        job: job.id,
        report,
        file: destination.display().to_string(),
    };
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&row)?);
    } else {
        println!("{}", Table::new([row]));
    }
    Ok(())
}

fn output_single<T: Serialize + PrettyPrint>(item: &T, json: bool) -> fossology::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        println!("{}", item.pretty_print());
    }
    Ok(())
}

// Table row types for non-JSON output

#[derive(Tabled, Serialize)]
struct WorkflowRow {
    upload: u64,
    job: u64,
    report: u64,
    file: String,
}
