//! Offset pagination over provider listings.
//!
//! Every provider listing is drained through [`collect_all`], which stops when
//! a page comes back shorter than the page size, when the offset reaches the
//! total the provider reported, or at [`MAX_PAGES`] as a hard bound.

use std::future::Future;

use crate::kernel::{ProviderError, ProviderResult};

/// Upper bound on pages fetched for one listing.
pub const MAX_PAGES: usize = 10_000;

/// One page of a provider listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total result count, when the provider reports one.
    pub total: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: Option<usize>) -> Self {
        Self { items, total }
    }
}

/// Fetch pages of `page_size` starting at offset 0 until the listing is
/// exhausted. `fetch` receives `(offset, limit)`.
pub async fn collect_all<T, F, Fut>(page_size: usize, mut fetch: F) -> ProviderResult<Vec<T>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = ProviderResult<Page<T>>>,
{
    if page_size == 0 {
        return Err(ProviderError::Validation(
            "page size must be positive".to_string(),
        ));
    }

    let mut items = Vec::new();
    let mut offset = 0;

    for _ in 0..MAX_PAGES {
        let page = fetch(offset, page_size).await?;
        let received = page.items.len();
        items.extend(page.items);
        offset += received;

        if received < page_size {
            return Ok(items);
        }
        if page.total.is_some_and(|total| offset >= total) {
            return Ok(items);
        }
    }

    tracing::error!(
        pages = MAX_PAGES,
        items = items.len(),
        "Listing did not terminate within page bound"
    );
    Err(ProviderError::Validation(format!(
        "listing exceeded {MAX_PAGES} pages"
    )))
}
