//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::FossologyClient;
use crate::error::Result;
use crate::pagination::{Page, PageRequest};

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List/filter entities with pagination support.
///
/// Implementors only provide [`List::list_page`]; the provided methods
/// run each page fetch under the client's retry policy and follow the
/// server's page count.
///
/// # Example
///
/// ```ignore
/// use fossology::{FossologyClient, Upload, List, PageRequest};
///
/// let client = FossologyClient::from_env()?;
///
/// // Fetch a single page
/// let page = Upload::list(&client, &Default::default(), PageRequest::single(1, 50)).await?;
///
/// // Fetch all pages
/// let all_uploads = Upload::list_all(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// Fetch exactly one page, without retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &FossologyClient,
        query: &Self::Query,
        page: u32,
        page_size: u32,
    ) -> Result<Page<Self>>;

    /// List entities matching the query.
    ///
    /// Returns the requested page, or all pages concatenated in server
    /// order when `request.all_pages` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails after retries.
    async fn list(
        client: &FossologyClient,
        query: &Self::Query,
        request: PageRequest,
    ) -> Result<Page<Self>> {
        let policy = client.retry_policy();
        let page_size = request.page_size.max(1);
        let mut page = request.page.max(1);

        let first = policy
            .run("list page", || Self::list_page(client, query, page, page_size))
            .await?;
        if !request.all_pages {
            return Ok(first);
        }

        let total_pages = first.total_pages;
        let mut all_items = first.items;

        while page < total_pages {
            page += 1;

            // Safety limit to prevent infinite loops
            if page > MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }

            let result = policy
                .run("list page", || Self::list_page(client, query, page, page_size))
                .await?;
            all_items.extend(result.items);
        }

        tracing::debug!(
            pages = total_pages,
            items = all_items.len(),
            "fetched all pages"
        );

        Ok(Page {
            items: all_items,
            page: request.page.max(1),
            page_size,
            total_pages,
            has_more: false,
        })
    }

    /// List all entities matching the query (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &FossologyClient, query: &Self::Query) -> Result<Vec<Self>> {
        Ok(Self::list(client, query, PageRequest::all()).await?.items)
    }
}
