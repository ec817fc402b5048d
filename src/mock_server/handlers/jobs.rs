//! Job endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{header_u64, info, paginate};
use crate::mock_server::state::SharedState;
use crate::JobSpec;

/// Query parameters for listing jobs.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub upload: Option<u64>,
}

/// GET /jobs and GET /jobs/all
pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(query): Query<ListJobsQuery>,
    headers: HeaderMap,
) -> Response {
    let state = state.read().await;
    paginate(state.list_jobs(query.upload), &headers)
}

/// GET /jobs/{id}
///
/// Every read moves the job one step: Queued, Processing, Completed.
pub async fn get_job(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let mut state = state.write().await;
    match state.advance_job(id) {
        Some(job) => Json(job).into_response(),
        None => info(StatusCode::NOT_FOUND, format!("Job id {id} doesn't exist")),
    }
}

/// POST /jobs
pub async fn schedule_job(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(_spec): Json<JobSpec>,
) -> Response {
    let (Some(_folder), Some(upload)) = (
        header_u64(&headers, "folderId"),
        header_u64(&headers, "uploadId"),
    ) else {
        return info(StatusCode::BAD_REQUEST, "folderId and uploadId are required");
    };

    let mut state = state.write().await;
    match state.schedule_job(upload) {
        Some(id) => info(StatusCode::CREATED, id),
        None => info(StatusCode::NOT_FOUND, format!("Upload id {upload} does not exists")),
    }
}
