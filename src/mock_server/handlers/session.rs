//! Token, info, health, user and group handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::{header, info};
use crate::mock_server::state::SharedState;
use crate::Group;

/// Form body of `POST /tokens`.
#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub username: String,
    pub password: String,
    pub token_name: String,
    #[allow(dead_code)]
    pub token_scope: String,
    #[allow(dead_code)]
    pub token_expire: String,
}

/// POST /tokens
pub async fn create_token(State(state): State<SharedState>, Form(form): Form<TokenForm>) -> Response {
    let mut state = state.write().await;
    match state.issue_token(&form.username, &form.password, &form.token_name) {
        Some(token) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "Authorization": format!("Bearer {token}") })),
        )
            .into_response(),
        None => info(StatusCode::NOT_FOUND, "Username or password is incorrect"),
    }
}

/// GET /info
pub async fn get_info(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    Json(serde_json::json!({
        "name": "FOSSology API",
        "description": "Automate your fossology instance using REST API",
        "version": state.api_version,
        "security": [],
        "contact": "fossology@fossology.org",
        "license": {
            "name": "GPL-2.0-only",
            "url": "https://www.gnu.org/licenses/old-licenses/gpl-2.0.html"
        },
        "fossology": {
            "version": "4.4.0",
            "branchName": "master",
            "commitHash": "0000000",
            "commitDate": "2024-01-01T00:00:00+00:00",
            "buildDate": "2024-01-01T00:00:00+00:00"
        }
    }))
}

/// GET /health
pub async fn get_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "scheduler": { "status": "OK" },
        "db": { "status": "OK" }
    }))
}

/// GET /users/self
pub async fn get_current_user(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    Json(state.user.clone())
}

/// GET /groups
pub async fn list_groups(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    Json(state.groups.values().cloned().collect::<Vec<Group>>())
}

/// POST /groups
pub async fn create_group(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let Some(name) = header(&headers, "name").filter(|n| !n.is_empty()) else {
        return info(StatusCode::BAD_REQUEST, "ERROR - no group name provided");
    };

    let mut state = state.write().await;
    match state.create_group(name) {
        Some(_) => info(StatusCode::OK, format!("Group {name} added.")),
        None => info(StatusCode::BAD_REQUEST, format!("Group {name} already exists")),
    }
}
