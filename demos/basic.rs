//! Basic example demonstrating the FOSSology API client.
//!
//! Run with:
//! ```
//! FOSS_TOKEN=your-token FOSSOLOGY_URL=http://localhost/repo cargo run --example basic
//! ```

use fossology::{
    ApiVersion, Folder, FossologyClient, HealthInfo, Job, JobListQuery, List, PageRequest,
    Upload, UploadListQuery,
};

#[tokio::main]
async fn main() -> fossology::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    let url = std::env::var("FOSSOLOGY_URL").unwrap_or_else(|_| "http://localhost/repo".to_string());
    let token = std::env::var("FOSS_TOKEN").map_err(|_| {
        fossology::FossologyError::ConfigMissing("FOSS_TOKEN environment variable not set".to_string())
    })?;

    println!("Connecting to {}...", url);
    let client = FossologyClient::connect(&url, &token, ApiVersion::V1).await?;
    if let Some(version) = client.server_version() {
        println!("Server API version: {}", version);
    }
    if let Some(user) = client.user() {
        println!("Logged in as: {}", user);
    }

    let health = HealthInfo::get(&client).await?;
    println!("Health: {} (healthy: {})", health.status, health.is_healthy());

    // Folders
    println!("\n--- Folders ---");
    let folders = Folder::list(&client, None).await?;
    for folder in &folders {
        println!("  - {}", folder);
    }

    // First page of uploads
    println!("\n--- Uploads (first page) ---");
    let uploads = Upload::list(&client, &UploadListQuery::default(), PageRequest::single(1, 10)).await?;
    println!(
        "Showing {} uploads (page {} of {})",
        uploads.len(),
        uploads.page,
        uploads.total_pages
    );
    for upload in &uploads {
        println!("  - {}", upload);
    }

    // Jobs and summary of the first upload
    if let Some(first) = uploads.items.first() {
        println!("\n--- Jobs of upload {} ---", first.id);
        let query = JobListQuery {
            upload: Some(first.id),
            ..Default::default()
        };
        let jobs = Job::list_all(&client, &query).await?;
        for job in &jobs {
            println!("  - {}", job);
        }

        println!("\n--- Summary ---");
        let summary = Upload::summary(&client, first.id, None).await?;
        println!(
            "  Main license: {}",
            summary.main_license.as_deref().unwrap_or("unknown")
        );
        println!("  Files to be cleared: {}", summary.files_to_be_cleared);
    }

    Ok(())
}
