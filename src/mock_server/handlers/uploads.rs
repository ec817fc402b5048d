//! Upload endpoint handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{header, header_u64, info, paginate};
use crate::mock_server::fixtures::Fixtures;
use crate::mock_server::state::SharedState;

/// Query parameters for listing uploads.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUploadsQuery {
    pub folder_id: Option<u64>,
    pub name: Option<String>,
}

/// GET /uploads
pub async fn list_uploads(
    State(state): State<SharedState>,
    Query(query): Query<ListUploadsQuery>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    let uploads: Vec<_> = state
        .list_uploads(query.folder_id)
        .into_iter()
        .filter(|u| {
            query
                .name
                .as_deref()
                .map_or(true, |n| u.upload_name.contains(n))
        })
        .collect();
    paginate(uploads, &headers)
}

/// GET /uploads/{id}
pub async fn get_upload(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let state = state.read().await;
    match state.uploads.get(&id) {
        Some(upload) => Json(upload.clone()).into_response(),
        None => info(StatusCode::NOT_FOUND, format!("Upload id {id} does not exists")),
    }
}

/// POST /uploads
///
/// Only file uploads (`multipart/form-data` with a `fileInput` part) are
/// supported.
pub async fn create_upload(
    State(state): State<SharedState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let Some(folder) = header_u64(&headers, "folderId") else {
        return info(StatusCode::BAD_REQUEST, "folderId header is required");
    };
    let description = header(&headers, "uploadDescription").unwrap_or_default();

    let mut file = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("fileInput") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((name, bytes.len() as u64)),
            Err(e) => return info(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }
    let Some((name, size)) = file else {
        return info(StatusCode::BAD_REQUEST, "fileInput is required");
    };

    let mut state = state.write().await;
    match state.create_upload(folder, &name, description, size) {
        Some(id) => info(StatusCode::CREATED, id),
        None => info(StatusCode::NOT_FOUND, format!("Folder id {folder} does not exists")),
    }
}

/// GET /uploads/{id}/summary
pub async fn get_upload_summary(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let state = state.read().await;
    match state.uploads.get(&id) {
        Some(upload) => Json(Fixtures::summary(upload)).into_response(),
        None => info(StatusCode::NOT_FOUND, format!("Upload id {id} does not exists")),
    }
}

/// DELETE /uploads/{id}
pub async fn delete_upload(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let mut state = state.write().await;
    match state.uploads.remove(&id) {
        Some(_) => info(StatusCode::ACCEPTED, format!("Delete Job for file with id {id}")),
        None => info(StatusCode::NOT_FOUND, format!("Upload id {id} does not exists")),
    }
}
