//! Enumerations shared across the FOSSology API.
//!
//! Each enum serializes to its wire string and parses from it with
//! [`FromStr`], so CLI arguments can be taken as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FossologyError;

/// Closed enum mapped to fixed wire strings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = FossologyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .copied()
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        FossologyError::InvalidArgument(format!(
                            "'{}' is not a valid {} (expected one of: {})",
                            wanted,
                            stringify!($name),
                            allowed.join(", ")
                        ))
                    })
            }
        }
    };
}

wire_enum! {
    /// Visibility of an upload.
    AccessLevel {
        Private => "private",
        Protected => "protected",
        Public => "public",
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::Protected
    }
}

wire_enum! {
    /// Report formats the server can generate.
    ReportFormat {
        Dep5 => "dep5",
        Spdx2 => "spdx2",
        Spdx2Tv => "spdx2tv",
        ReadmeOss => "readmeoss",
        UnifiedReport => "unifiedreport",
        CliXml => "clixml",
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::ReadmeOss
    }
}

wire_enum! {
    /// Scope of an API token. `Read` only permits GET calls.
    TokenScope {
        Read => "read",
        Write => "write",
    }
}

wire_enum! {
    /// Clearing status of an upload.
    ClearingStatus {
        Open => "Open",
        InProgress => "InProgress",
        Closed => "Closed",
        Rejected => "Rejected",
    }
}

wire_enum! {
    /// License kind filter.
    LicenseType {
        Candidate => "candidate",
        Main => "main",
        All => "all",
    }
}

wire_enum! {
    /// Kind of item a search looks at.
    SearchType {
        AllFiles => "allfiles",
        Containers => "containers",
        Directory => "directory",
    }
}

impl Default for SearchType {
    fn default() -> Self {
        Self::AllFiles
    }
}

wire_enum! {
    /// Copyright statements counted for an item.
    CopyrightStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

wire_enum! {
    /// How the server picks the neighbours of an item.
    PrevNextSelection {
        WithLicenses => "withLicenses",
        NoClearing => "noClearing",
    }
}

wire_enum! {
    /// Reach of a clearing decision.
    ClearingScope {
        Local => "local",
        Package => "package",
        Global => "global",
    }
}

wire_enum! {
    /// Kind of clearing decision.
    ClearingType {
        ToBeDiscussed => "TO_BE_DISCUSSED",
        Irrelevant => "IRRELEVANT",
        Identified => "IDENTIFIED",
        DoNotUse => "DO_NOT_USE",
        NonFunctional => "NON_FUNCTIONAL",
    }
}

wire_enum! {
    /// Whether a bulk action adds or removes its license.
    LicenseAction {
        Add => "ADD",
        Remove => "REMOVE",
    }
}

wire_enum! {
    /// Where a bulk scan applies its decisions.
    BulkScope {
        Folder => "folder",
        Upload => "upload",
    }
}

/// Status of a scan job.
///
/// Values the server may add later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    #[default]
    Queued,
    Processing,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "Queued",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Other(s) => s,
        }
    }

    /// Whether the job has stopped running.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Queued" => Self::Queued,
            "Processing" => Self::Processing,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            _ => Self::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level of a user account.
///
/// Values the server may add later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserAccessLevel {
    #[default]
    None,
    ReadOnly,
    ReadWrite,
    ClearingAdmin,
    Admin,
    Other(String),
}

impl UserAccessLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
            Self::ClearingAdmin => "clearing_admin",
            Self::Admin => "admin",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for UserAccessLevel {
    fn from(s: String) -> Self {
        match s.as_str() {
            "none" => Self::None,
            "read_only" => Self::ReadOnly,
            "read_write" => Self::ReadWrite,
            "clearing_admin" => Self::ClearingAdmin,
            "admin" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<UserAccessLevel> for String {
    fn from(level: UserAccessLevel) -> Self {
        match level {
            UserAccessLevel::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for UserAccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("spdx2tv".parse::<ReportFormat>().unwrap(), ReportFormat::Spdx2Tv);
        assert_eq!("ReadmeOSS".parse::<ReportFormat>().unwrap(), ReportFormat::ReadmeOss);

        let err = "pdf".parse::<ReportFormat>().unwrap_err();
        assert!(err.to_string().contains("unifiedreport"));
    }

    #[test]
    fn test_clearing_status_wire_format() {
        let json = serde_json::to_string(&ClearingStatus::InProgress).unwrap();
        assert_eq!(json, "\"InProgress\"");
        let status: ClearingStatus = serde_json::from_str("\"Rejected\"").unwrap();
        assert_eq!(status, ClearingStatus::Rejected);
    }

    #[test]
    fn test_clearing_type_parses_server_casing() {
        assert_eq!("Identified".parse::<ClearingType>().unwrap(), ClearingType::Identified);
        assert_eq!(
            serde_json::to_string(&PrevNextSelection::WithLicenses).unwrap(),
            "\"withLicenses\""
        );
    }

    #[test]
    fn test_access_level_default_is_protected() {
        assert_eq!(AccessLevel::default().as_str(), "protected");
        assert_eq!("PUBLIC".parse::<AccessLevel>().unwrap(), AccessLevel::Public);
    }

    #[test]
    fn test_job_status_keeps_unknown_values() {
        let status: JobStatus = serde_json::from_str("\"Killed\"").unwrap();
        assert_eq!(status, JobStatus::Other("Killed".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"Killed\"");
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
    }

    #[test]
    fn test_user_access_level_round_trip() {
        let level: UserAccessLevel = serde_json::from_str("\"clearing_admin\"").unwrap();
        assert_eq!(level, UserAccessLevel::ClearingAdmin);
        let level: UserAccessLevel = serde_json::from_str("\"auditor\"").unwrap();
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"auditor\"");
    }
}
