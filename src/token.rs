//! Token bootstrap from username and password.

use std::fmt;

use chrono::{Local, NaiveDate, TimeDelta};
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::client::{check_response, decode_json, ApiVersion};
use crate::error::{FossologyError, Result};
use crate::models::TokenScope;
use crate::retry::RetryPolicy;

/// Days a generated token stays valid unless told otherwise.
pub const DEFAULT_TOKEN_VALIDITY_DAYS: i64 = 30;

/// Credentials and settings for a new API token.
#[derive(Clone)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
    pub token_name: String,
    pub scope: TokenScope,
    pub expire: NaiveDate,
    pub version: ApiVersion,
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("username", &self.username)
            .field("token_name", &self.token_name)
            .field("scope", &self.scope)
            .field("expire", &self.expire)
            .finish_non_exhaustive()
    }
}

impl TokenRequest {
    /// A request with a random token name, expiring in 30 days.
    pub fn new(username: &str, password: &str, scope: TokenScope) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            token_name: random_token_name(),
            scope,
            expire: Local::now().date_naive() + TimeDelta::days(DEFAULT_TOKEN_VALIDITY_DAYS),
            version: ApiVersion::default(),
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
            ("token_name", self.token_name.clone()),
            ("token_scope", self.scope.to_string()),
            ("token_expire", self.expire.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// Random token name, e.g. `foss_cli_Xk3d9QaZ`.
pub fn random_token_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("foss_cli_{suffix}")
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(rename = "Authorization")]
    authorization: String,
}

/// Obtain a new API token, retrying transient failures with the default
/// policy.
///
/// # Errors
///
/// Returns [`FossologyError::Authentication`] on bad credentials or when
/// the server cannot be reached.
pub async fn obtain_token(server_url: &str, request: &TokenRequest) -> Result<String> {
    obtain_token_with_policy(server_url, request, &RetryPolicy::default()).await
}

/// Obtain a new API token under a specific retry policy.
#[tracing::instrument(skip(request, policy), fields(username = %request.username))]
pub async fn obtain_token_with_policy(
    server_url: &str,
    request: &TokenRequest,
    policy: &RetryPolicy,
) -> Result<String> {
    let base = if server_url.ends_with('/') {
        server_url.to_string()
    } else {
        format!("{server_url}/")
    };
    let url = Url::parse(&base)?.join(&format!("api/{}/tokens", request.version))?;
    let http = Client::builder().build().map_err(FossologyError::HttpError)?;
    let form = request.form();

    let result = policy
        .run("token request", || {
            let url = url.clone();
            let pending = http.post(url).form(&form).send();
            async move {
                match pending.await {
                    Ok(response) => check_response(response).await,
                    Err(e) => Err(FossologyError::HttpError(e)),
                }
            }
        })
        .await;

    let response = match result {
        Ok(response) => response,
        Err(FossologyError::HttpError(e)) => {
            return Err(FossologyError::Authentication {
                url: server_url.to_string(),
                reason: format!("Server {server_url} does not seem to be running or is unreachable: {e}"),
            });
        }
        Err(e) if matches!(e.status_code(), Some(401 | 403 | 404)) => {
            return Err(FossologyError::Authentication {
                url: server_url.to_string(),
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e.context("Error while generating new token")),
    };

    let token: TokenResponse = decode_json(response).await?;
    tracing::debug!("Token {} generated for {}", request.token_name, request.username);

    Ok(token
        .authorization
        .trim()
        .trim_start_matches("Bearer ")
        .to_string())
}
