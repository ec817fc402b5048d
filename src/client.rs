//! FOSSology API client.
//!
//! Low-level HTTP session that handles authentication, the versioned path
//! prefix and raw requests. Higher-level operations are implemented via
//! traits and inherent methods on entity types.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, RETRY_AFTER};
use reqwest::multipart::Form;
use reqwest::{Client, Method, Response, StatusCode};
use semver::Version;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{FossologyError, Result};
use crate::models::{ApiInfo, User};
use crate::retry::RetryPolicy;

const DEFAULT_API_URL: &str = "http://localhost/repo";
const USER_AGENT: &str = concat!("fossology-rs/", env!("CARGO_PKG_VERSION"));

/// Version of the REST API, used as path prefix (`/api/v1`, `/api/v2`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    V1,
    V2,
}

impl ApiVersion {
    /// Path segment for this version.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = FossologyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" => Ok(Self::V2),
            other => Err(FossologyError::InvalidArgument(format!(
                "unknown API version '{other}' (expected v1 or v2)"
            ))),
        }
    }
}

/// Body attached to a request.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
    Multipart(Form),
}

/// Query parameters, headers and body for [`FossologyClient::request`].
///
/// Most FOSSology endpoints take their arguments as request headers
/// (`folderId`, `groupName`, `limit`, ...), so headers are first-class here.
#[derive(Debug, Default)]
pub struct RequestOptions {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter when a value is present.
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl ToString) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a request header when a value is present.
    #[must_use]
    pub fn header_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.header(name, v),
            None => self,
        }
    }

    /// Scope the request to a group (`groupName` header).
    #[must_use]
    pub fn group(self, group: Option<&str>) -> Self {
        self.header_opt("groupName", group)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach a url-encoded form body.
    #[must_use]
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(fields));
        self
    }

    /// Attach a multipart body.
    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Look up a header that was set on these options.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw file content returned by a download endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Bytes exactly as sent by the server.
    pub content: Vec<u8>,
    /// File name taken from the `Content-Disposition` header.
    pub filename: String,
}

/// Low-level FOSSology API client.
///
/// Holds the server URL, bearer token, API version prefix and retry policy.
/// All of them are fixed at construction; obtaining a new token means
/// building a new client.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool. Calls on one client run sequentially within each
/// future; running several futures concurrently is up to the caller.
///
/// # Example
///
/// ```no_run
/// use fossology::FossologyClient;
///
/// # async fn example() -> fossology::Result<()> {
/// // Create from environment variables
/// let client = FossologyClient::from_env()?;
///
/// // Or configure manually
/// let client = FossologyClient::new("http://localhost/repo", "your-token")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FossologyClient {
    http: Client,
    host: Arc<Url>,
    api_url: Arc<Url>,
    token: String,
    version: ApiVersion,
    retry: RetryPolicy,
    server_version: Option<Version>,
    user: Option<Arc<User>>,
}

impl fmt::Debug for FossologyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FossologyClient")
            .field("api_url", &self.api_url.as_str())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl FossologyClient {
    /// Create a client from environment variables.
    ///
    /// Uses `FOSS_TOKEN` for authentication, `FOSSOLOGY_URL` for the server
    /// (defaults to `http://localhost/repo`) and optionally
    /// `FOSSOLOGY_API_VERSION` (`v1` or `v2`).
    ///
    /// # Errors
    ///
    /// Returns an error if `FOSS_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("FOSS_TOKEN").map_err(|_| {
            FossologyError::ConfigMissing("FOSS_TOKEN environment variable not set".to_string())
        })?;

        let url = env::var("FOSSOLOGY_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let version = match env::var("FOSSOLOGY_API_VERSION") {
            Ok(v) => v.parse()?,
            Err(_) => ApiVersion::default(),
        };

        Self::with_version(&url, &token, version)
    }

    /// Create a new client for API v1 without contacting the server.
    ///
    /// # Arguments
    ///
    /// * `url` - Server URL (e.g., `http://fossology/repo`)
    /// * `token` - API token
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: &str, token: &str) -> Result<Self> {
        Self::with_version(url, token, ApiVersion::V1)
    }

    /// Create a new client for the given API version without contacting
    /// the server.
    pub fn with_version(url: &str, token: &str, version: ApiVersion) -> Result<Self> {
        let host = Url::parse(&with_trailing_slash(url))?;
        let api_url = host.join(&format!("api/{version}/"))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(FossologyError::HttpError)?;

        Ok(Self {
            http,
            host: Arc::new(host),
            api_url: Arc::new(api_url),
            token: token.to_string(),
            version,
            retry: RetryPolicy::default(),
            server_version: None,
            user: None,
        })
    }

    /// Create a client and establish the session.
    ///
    /// Fetches `/info` to learn the server's API version (used for feature
    /// gating) and `/users/self` to validate the token.
    ///
    /// # Errors
    ///
    /// Returns [`FossologyError::Authentication`] if the server is
    /// unreachable or rejects the token.
    #[tracing::instrument(skip(token))]
    pub async fn connect(url: &str, token: &str, version: ApiVersion) -> Result<Self> {
        let mut client = Self::with_version(url, token, version)?;

        let info = ApiInfo::get(&client)
            .await
            .map_err(|e| client.authentication_error(e))?;
        client.server_version = parse_server_version(&info.version);

        let user = User::current(&client)
            .await
            .map_err(|e| client.authentication_error(e))?;

        tracing::info!(
            user = %user.name,
            host = %client.host,
            api_version = %info.version,
            "authenticated"
        );
        client.user = Some(Arc::new(user));

        Ok(client)
    }

    /// Replace the retry policy used for transient failures.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Server URL as given at construction.
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Versioned API root (e.g., `http://fossology/repo/api/v1/`).
    pub fn base_url(&self) -> &Url {
        &self.api_url
    }

    /// API version used as path prefix.
    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// Retry policy applied to transient failures.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// API version reported by the server, known after [`Self::connect`].
    pub fn server_version(&self) -> Option<&Version> {
        self.server_version.as_ref()
    }

    /// The authenticated user, known after [`Self::connect`].
    pub fn user(&self) -> Option<&User> {
        self.user.as_deref()
    }

    /// Fail with [`FossologyError::Unsupported`] if the server's API version
    /// is known and older than `min`.
    pub fn require_version(&self, feature: &str, min: &Version) -> Result<()> {
        match &self.server_version {
            Some(v) if v < min => Err(FossologyError::Unsupported(format!(
                "Endpoint {feature} is not supported by your FOSSology API version {v} (requires {min})"
            ))),
            _ => Ok(()),
        }
    }

    /// Send an authenticated request.
    ///
    /// `path` is relative to the versioned API root. Non-success statuses
    /// are converted into typed errors; no retry happens at this layer.
    #[tracing::instrument(skip(self, options), fields(method = %method))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = self.api_url.join(path.trim_start_matches('/'))?;

        let mut builder = self
            .http
            .request(method, url)
            .bearer_auth(&self.token);

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match options.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Form(fields)) => builder.form(&fields),
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            None => builder,
        };

        let response = builder.send().await.map_err(FossologyError::HttpError)?;

        check_response(response).await
    }

    /// Make a GET request.
    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, path, options).await
    }

    /// Make a POST request.
    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::POST, path, options).await
    }

    /// Make a PUT request.
    pub async fn put(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PUT, path, options).await
    }

    /// Make a PATCH request.
    pub async fn patch(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::PATCH, path, options).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, path, options).await
    }

    fn authentication_error(&self, err: FossologyError) -> FossologyError {
        match err {
            FossologyError::Authorization { .. }
            | FossologyError::HttpError(_)
            | FossologyError::ApiError {
                status_code: Some(401),
                ..
            } => FossologyError::Authentication {
                url: self.host.to_string(),
                reason: err.to_string(),
            },
            other => other,
        }
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

/// Parse versions such as `1.4.3` or `1.6` leniently.
fn parse_server_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    Version::parse(trimmed).ok().or_else(|| {
        let mut parts = trimmed.split('.').map(|p| p.parse::<u64>().ok());
        let major = parts.next()??;
        let minor = parts.next().flatten().unwrap_or(0);
        Some(Version::new(major, minor, 0))
    })
}

/// Check response status and convert errors.
pub(crate) async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() || status.is_redirection() {
        return Ok(response);
    }

    let retry_after = retry_after_secs(response.headers());
    let message = extract_error_message(response, status).await;

    match status {
        StatusCode::FORBIDDEN => Err(FossologyError::Authorization {
            message,
            status_code: status.as_u16(),
        }),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
            Err(FossologyError::NotReady {
                message,
                status_code: status.as_u16(),
                retry_after_secs: retry_after,
            })
        }
        _ => Err(FossologyError::ApiError {
            message,
            status_code: Some(status.as_u16()),
        }),
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Extract error message from a failed response.
///
/// Prefers the `message` (or `error`) field of a JSON body and falls back
/// to the HTTP status line.
async fn extract_error_message(response: Response, status: StatusCode) -> String {
    let status_line = format!("HTTP {status}");
    let body = match response.text().await {
        Ok(b) => b,
        Err(_) => return status_line,
    };

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
            return format!("{msg} ({})", status.as_u16());
        }
        if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
            return format!("{err} ({})", status.as_u16());
        }
    }

    status_line
}

/// Decode a JSON body, reporting malformed payloads as API errors.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(FossologyError::HttpError)?;

    serde_json::from_str(&body).map_err(|e| FossologyError::ApiError {
        message: format!("Unable to decode response body: {e}"),
        status_code: Some(status.as_u16()),
    })
}

/// The `message` field of FOSSology's `{"code", "message", "type"}` replies.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct Info {
    #[serde(default)]
    pub message: serde_json::Value,
}

impl Info {
    /// The message as text, whether the server sent a string or a number.
    pub fn text(&self) -> String {
        match &self.message {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// The message parsed as a numeric id.
    pub fn id(&self) -> Option<u64> {
        match &self.message {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Read the whole body of a download response.
pub(crate) async fn read_download(response: Response) -> Result<Download> {
    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_content_disposition)
        .ok_or_else(|| FossologyError::ApiError {
            message: "Download response carries no Content-Disposition file name".to_string(),
            status_code: Some(response.status().as_u16()),
        })?;

    let content = response
        .bytes()
        .await
        .map_err(FossologyError::HttpError)?
        .to_vec();

    Ok(Download { content, filename })
}

/// Extract the file name from a `Content-Disposition` header value.
pub(crate) fn filename_from_content_disposition(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|part| {
        let (key, raw) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = raw.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}
