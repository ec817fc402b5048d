//! Folder endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use super::{header, header_u64, info};
use crate::mock_server::state::SharedState;
use crate::Folder;

/// GET /folders
pub async fn list_folders(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    Json(state.folders.values().cloned().collect::<Vec<Folder>>())
}

/// GET /folders/{id}
pub async fn get_folder(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let state = state.read().await;
    match state.folders.get(&id) {
        Some(folder) => Json(folder.clone()).into_response(),
        None => info(StatusCode::NOT_FOUND, format!("Folder id {id} does not exists")),
    }
}

/// POST /folders
///
/// Answers 201 with the new id, or 200 when the folder already exists.
pub async fn create_folder(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let (Some(parent), Some(name)) = (
        header_u64(&headers, "parentFolder"),
        header(&headers, "folderName"),
    ) else {
        return info(StatusCode::BAD_REQUEST, "parentFolder and folderName are required");
    };
    let description = header(&headers, "folderDescription").unwrap_or_default();

    let mut state = state.write().await;
    if !state.folders.contains_key(&parent) {
        return info(StatusCode::NOT_FOUND, format!("Parent folder {parent} does not exist"));
    }

    match state.create_folder(parent, name, description) {
        (id, true) => info(StatusCode::CREATED, id),
        (_, false) => info(StatusCode::OK, format!("Folder with name {name} already exists")),
    }
}

/// DELETE /folders/{id}
pub async fn delete_folder(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let mut state = state.write().await;
    if state.folders.get(&id).is_some_and(Folder::is_root) {
        return info(StatusCode::FORBIDDEN, "Can not delete root folder");
    }
    if state.delete_folder(id) {
        info(StatusCode::ACCEPTED, format!("Delete Job for folder {id}"))
    } else {
        info(StatusCode::NOT_FOUND, format!("Folder id {id} does not exists"))
    }
}
