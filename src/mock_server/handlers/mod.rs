//! HTTP request handlers for the mock server.

pub mod folders;
pub mod jobs;
pub mod reports;
pub mod session;
pub mod uploads;

pub use folders::*;
pub use jobs::*;
pub use reports::*;
pub use session::*;
pub use uploads::*;

use axum::{
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::TOTAL_PAGES_HEADER;

/// FOSSology's `{"code", "message", "type"}` reply.
pub(crate) fn info(status: StatusCode, message: impl Into<serde_json::Value>) -> Response {
    let kind = if status.is_success() { "INFO" } else { "ERROR" };
    (
        status,
        Json(serde_json::json!({
            "code": status.as_u16(),
            "message": message.into(),
            "type": kind,
        })),
    )
        .into_response()
}

/// A header as text.
pub(crate) fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// A header as a number.
pub(crate) fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header(headers, name).and_then(|v| v.trim().parse().ok())
}

/// Serve one page of `items` according to the `page` and `limit` headers.
pub(crate) fn paginate<T: Serialize>(items: Vec<T>, headers: &HeaderMap) -> Response {
    let limit = header_u64(headers, "limit").unwrap_or(100).max(1) as usize;
    let page = header_u64(headers, "page").unwrap_or(1).max(1) as usize;
    let total_pages = items.len().div_ceil(limit).max(1);

    let page_items: Vec<T> = items.into_iter().skip((page - 1) * limit).take(limit).collect();

    let mut response = (StatusCode::OK, Json(page_items)).into_response();
    response
        .headers_mut()
        .insert(TOTAL_PAGES_HEADER, HeaderValue::from(total_pages as u64));
    response
}
