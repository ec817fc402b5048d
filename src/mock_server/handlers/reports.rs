//! Report endpoint handlers.

use axum::{
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE, LOCATION, RETRY_AFTER},
        HeaderMap, StatusCode,
    },
    response::{IntoResponse, Response},
};

use super::{header, header_u64, info};
use crate::mock_server::state::{ReportPoll, SharedState};
use crate::ReportFormat;

/// GET /report
///
/// Answers 201 with the download URL of the new report.
pub async fn generate_report(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let Some(upload) = header_u64(&headers, "uploadId") else {
        return info(StatusCode::BAD_REQUEST, "uploadId header is required");
    };
    let format = match header(&headers, "reportFormat").map(str::parse::<ReportFormat>) {
        None => ReportFormat::default(),
        Some(Ok(format)) => format,
        Some(Err(e)) => return info(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let mut state = state.write().await;
    let Some(id) = state.create_report(upload, format) else {
        return info(StatusCode::NOT_FOUND, format!("Upload id {upload} does not exists"));
    };

    let location = format!("http://localhost/repo/api/v1/report/{id}");
    let mut response = info(StatusCode::CREATED, location.clone());
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

/// GET /report/{id}
///
/// Answers 503 with `Retry-After: 0` while the report is pending.
pub async fn download_report(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let mut state = state.write().await;
    match state.poll_report(id) {
        ReportPoll::Missing => info(StatusCode::NOT_FOUND, format!("Report id {id} does not exists")),
        ReportPoll::Pending => {
            let mut response = info(
                StatusCode::SERVICE_UNAVAILABLE,
                "Report is not ready yet. Check back after some time",
            );
            response
                .headers_mut()
                .insert(RETRY_AFTER, axum::http::HeaderValue::from_static("0"));
            response
        }
        ReportPoll::Ready(report) => (
            StatusCode::OK,
            [
                (CONTENT_TYPE, "text/plain".to_string()),
                (
                    CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", report.filename),
                ),
            ],
            report.content,
        )
            .into_response(),
    }
}
