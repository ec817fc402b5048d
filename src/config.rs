//! `foss_cli` configuration file.
//!
//! The file lives in the working directory as `.foss_cli.toml`:
//!
//! ```toml
//! [fossology]
//! server_url = "http://fossology/repo"
//! username = "fossy"
//! token = "eyJ0eXAiOiJKV1Q..."
//! api_version = "v1"
//! default_group = "fossy"
//! report_format = "unifiedreport"
//! ```
//!
//! It is read once at startup. Only the `config` command writes it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::client::ApiVersion;
use crate::error::{FossologyError, Result};
use crate::models::ReportFormat;

/// Default config file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE_NAME: &str = ".foss_cli.toml";

/// Default server URL offered by the `config` command.
pub const DEFAULT_SERVER_URL: &str = "http://fossology/repo";

/// Top-level structure of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub fossology: FossologySection,
}

/// The `[fossology]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FossologySection {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_format: Option<ReportFormat>,
}

impl Default for FossologySection {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            username: String::new(),
            token: String::new(),
            api_version: default_api_version(),
            default_group: None,
            default_folder: None,
            report_format: None,
        }
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_api_version() -> String {
    ApiVersion::default().to_string()
}

impl FossologySection {
    /// Parsed API version.
    pub fn api_version(&self) -> Result<ApiVersion> {
        self.api_version.parse()
    }
}

impl CliConfig {
    /// Parse a config from TOML text.
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load a config file. A missing file yields `None`.
    pub async fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let config = Self::parse(&content)?;
                tracing::debug!(path = %path.display(), "loaded config file");
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FossologyError::Io(e)),
        }
    }

    /// Write the config file, replacing any previous content.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::write(path.as_ref(), content).await?;
        Ok(())
    }

    /// Pick the token to use: command line first, then `FOSS_TOKEN`, then
    /// the stored one.
    pub fn resolve_token(&self, cli_token: Option<&str>, env_token: Option<&str>) -> Option<String> {
        [cli_token, env_token, Some(self.fossology.token.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(str::to_string)
    }
}
