//! Error types for FOSSology API operations.

use thiserror::Error;

/// Errors that can occur during FOSSology API operations.
#[derive(Debug, Error)]
pub enum FossologyError {
    /// Configuration is missing or incomplete.
    #[error("FOSSology configuration required: {0}")]
    ConfigMissing(String),

    /// A caller-supplied value was rejected before reaching the server.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Token bootstrap failed: bad credentials or unreachable server.
    #[error("Authentication error against {url}: {reason}")]
    Authentication { url: String, reason: String },

    /// The server answered 403 for the requested resource or group.
    ///
    /// The message already ends with the status.
    #[error("{message}")]
    Authorization { message: String, status_code: u16 },

    /// API request failed.
    #[error("FOSSology API error: {message}")]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// The server is busy or the requested resource is not ready yet.
    #[error("{message}, retry after {retry_after_secs:?} seconds")]
    NotReady {
        message: String,
        status_code: u16,
        retry_after_secs: Option<u64>,
    },

    /// Endpoint not available for the server's API version.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// A polling loop ran out of its wait budget.
    #[error("Timed out after {waited_secs}s waiting for {operation}")]
    Timeout { operation: String, waited_secs: u64 },

    /// Entity not found.
    #[error("{entity_type} '{id}' not found")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Local file system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("Invalid config file: {0}")]
    Config(#[from] toml::de::Error),
}

impl FossologyError {
    /// HTTP status attached to this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authorization { status_code, .. } | Self::NotReady { status_code, .. } => {
                Some(*status_code)
            }
            Self::ApiError { status_code, .. } => *status_code,
            Self::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the retry policy may try the failed operation again.
    ///
    /// Only "not ready" answers and connection-level failures qualify.
    /// Permission errors, missing resources and malformed requests do not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NotReady { .. } => true,
            Self::HttpError(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Prefix the server message with a description of the failed operation.
    #[must_use]
    pub fn context(self, description: impl AsRef<str>) -> Self {
        let description = description.as_ref();
        match self {
            Self::Authorization {
                message,
                status_code,
            } => Self::Authorization {
                message: format!("{description}: {message}"),
                status_code,
            },
            Self::ApiError {
                message,
                status_code,
            } => Self::ApiError {
                message: format!("{description}: {message}"),
                status_code,
            },
            Self::NotReady {
                message,
                status_code,
                retry_after_secs,
            } => Self::NotReady {
                message: format!("{description}: {message}"),
                status_code,
                retry_after_secs,
            },
            other => other,
        }
    }
}

/// Result type alias for FOSSology operations.
pub type Result<T> = core::result::Result<T, FossologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefixes_api_message() {
        let err = FossologyError::ApiError {
            message: "Upload does not exist".to_string(),
            status_code: Some(404),
        }
        .context("Error while getting details for upload 12");

        assert_eq!(
            err.to_string(),
            "FOSSology API error: Error while getting details for upload 12: Upload does not exist"
        );
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn test_context_keeps_authorization_kind() {
        let err = FossologyError::Authorization {
            message: "Forbidden".to_string(),
            status_code: 403,
        }
        .context("Scheduling job not authorized");

        assert!(matches!(err, FossologyError::Authorization { status_code: 403, .. }));
        assert!(err.to_string().starts_with("Scheduling job not authorized"));
    }

    #[test]
    fn test_authorization_display_shows_status_once() {
        let err = FossologyError::Authorization {
            message: "Forbidden (403)".to_string(),
            status_code: 403,
        }
        .context("Deleting folder 1 not authorized");

        assert_eq!(err.to_string(), "Deleting folder 1 not authorized: Forbidden (403)");
    }

    #[test]
    fn test_context_leaves_timeout_untouched() {
        let err = FossologyError::Timeout {
            operation: "job 3".to_string(),
            waited_secs: 30,
        }
        .context("ignored");

        assert_eq!(err.to_string(), "Timed out after 30s waiting for job 3");
    }

    #[test]
    fn test_retryable_classification() {
        let not_ready = FossologyError::NotReady {
            message: "busy".to_string(),
            status_code: 503,
            retry_after_secs: Some(2),
        };
        assert!(not_ready.is_retryable());

        let forbidden = FossologyError::Authorization {
            message: "no".to_string(),
            status_code: 403,
        };
        assert!(!forbidden.is_retryable());

        let missing = FossologyError::ApiError {
            message: "gone".to_string(),
            status_code: Some(404),
        };
        assert!(!missing.is_retryable());
    }
}
