//! Pagination utilities for FOSSology API responses.
//!
//! List endpoints take `limit` and `page` request headers and report the
//! number of available pages in the `X-Total-Pages` response header.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::{decode_json, RequestOptions};
use crate::error::Result;

/// Response header carrying the total number of pages.
pub const TOTAL_PAGES_HEADER: &str = "X-Total-Pages";

/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A page of results from the FOSSology API.
///
/// When produced with [`PageRequest::all_pages`] set, `items` holds the
/// concatenation of every page in server order and `has_more` is false.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-indexed).
    pub page: u32,
    /// Number of items requested per page.
    pub page_size: u32,
    /// Number of pages reported by the server.
    pub total_pages: u32,
    /// Whether there are more pages.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_pages: u32) -> Self {
        Self {
            items,
            page,
            page_size,
            total_pages,
            has_more: page < total_pages,
        }
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            has_more: self.has_more,
        }
    }

    /// Page number to request next, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.has_more.then_some(self.page + 1)
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Which page(s) a list call should fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// First page to fetch (1-indexed).
    pub page: u32,
    /// Number of items per page.
    pub page_size: u32,
    /// Keep fetching until the last page.
    pub all_pages: bool,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            all_pages: false,
        }
    }
}

impl PageRequest {
    /// Request a single page.
    #[must_use]
    pub fn single(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
            all_pages: false,
        }
    }

    /// Request every page, starting at page 1.
    #[must_use]
    pub fn all() -> Self {
        Self {
            all_pages: true,
            ..Self::default()
        }
    }

    /// Same request with a different page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

/// Add the `limit` and `page` headers to a request.
pub(crate) fn page_headers(options: RequestOptions, page: u32, page_size: u32) -> RequestOptions {
    options.header("limit", page_size).header("page", page)
}

/// Read the `X-Total-Pages` header, treating a missing or garbled value as
/// "the current page is the last one".
pub(crate) fn total_pages(response: &Response, page: u32) -> u32 {
    response
        .headers()
        .get(TOTAL_PAGES_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(page)
}

/// Decode one page of a list response.
pub(crate) async fn read_page<T: DeserializeOwned>(
    response: Response,
    page: u32,
    page_size: u32,
) -> Result<Page<T>> {
    let total = total_pages(&response, page);
    let items: Vec<T> = decode_json(response).await?;
    Ok(Page::new(items, page, page_size, total))
}
