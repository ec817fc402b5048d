//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use crate::models::{Folder, Group, Job, Summary, Upload};

/// Trait for human-readable key-value output.
///
/// Implemented by entity types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

fn header_lines(header: String) -> Vec<String> {
    let divider = "─".repeat(header.chars().count().max(30));
    vec![header, divider]
}

impl PrettyPrint for Upload {
    fn pretty_print(&self) -> String {
        let mut lines = header_lines(format!("Upload #{}: {}", self.id, self.upload_name));
        lines.push(format!("Folder:         {} ({})", self.folder_name, self.folder_id));

        if !self.description.is_empty() {
            lines.push(format!("Description:    {}", self.description));
        }

        if !self.upload_date.is_empty() {
            lines.push(format!("Uploaded:       {}", self.upload_date));
        }

        if let Some(size) = self.size() {
            lines.push(format!("Size:           {} bytes", size));
        }

        if let Some(ref hash) = self.hash {
            if let Some(ref sha1) = hash.sha1 {
                lines.push(format!("SHA1:           {}", sha1));
            }
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Job {
    fn pretty_print(&self) -> String {
        let mut lines = header_lines(format!("Job #{}: {}", self.id, self.name));
        lines.push(format!("Status:         {}", self.status));

        if let Some(upload) = self.upload_id {
            lines.push(format!("Upload:         {}", upload));
        }

        if !self.queue_date.is_empty() {
            lines.push(format!("Queued:         {}", self.queue_date));
        }

        if let Some(eta) = self.eta.filter(|eta| *eta > 0) {
            lines.push(format!("ETA:            {}s", eta));
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Folder {
    fn pretty_print(&self) -> String {
        let mut lines = header_lines(format!("Folder #{}: {}", self.id, self.name));

        if !self.description.is_empty() {
            lines.push(format!("Description:    {}", self.description));
        }

        match self.parent {
            Some(parent) => lines.push(format!("Parent:         {}", parent)),
            None => lines.push("Parent:         (root)".to_string()),
        }

        lines.join("\n")
    }
}

impl PrettyPrint for Group {
    fn pretty_print(&self) -> String {
        header_lines(format!("Group #{}: {}", self.id, self.name)).join("\n")
    }
}

impl PrettyPrint for Summary {
    fn pretty_print(&self) -> String {
        let mut lines = header_lines(format!("Summary of upload #{}: {}", self.id, self.upload_name));

        if let Some(ref main) = self.main_license {
            lines.push(format!("Main license:   {}", main));
        }

        lines.push(format!(
            "Licenses:       {} unique, {} total",
            self.unique_licenses, self.total_licenses
        ));
        lines.push(format!(
            "Concluded:      {} unique, {} total",
            self.unique_concluded_licenses, self.total_concluded_licenses
        ));
        lines.push(format!(
            "Files:          {} cleared, {} to be cleared",
            self.files_cleared, self.files_to_be_cleared
        ));

        if let Some(status) = self.clearing_status {
            lines.push(format!("Clearing:       {}", status));
        }

        lines.push(format!("Copyrights:     {}", self.copyright_count));

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_pretty_print_format() {
        let upload: Upload = serde_json::from_value(serde_json::json!({
            "folderid": 1,
            "foldername": "Software Repository",
            "id": 3,
            "description": "",
            "uploadname": "base-files_11.tar.xz",
            "uploaddate": "2024-01-05 13:25:38.079869+00",
            "hash": {"sha1": "abc", "md5": null, "sha256": null, "size": 42}
        }))
        .unwrap();

        let output = upload.pretty_print();
        assert!(output.starts_with("Upload #3: base-files_11.tar.xz"));
        assert!(output.contains("Size:           42 bytes"));
        assert!(!output.contains("Description:"));
    }

    #[test]
    fn test_folder_root_parent() {
        let folder: Folder = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Software Repository",
            "description": "Top Folder",
            "parent": null
        }))
        .unwrap();

        assert!(folder.pretty_print().contains("Parent:         (root)"));
    }
}
