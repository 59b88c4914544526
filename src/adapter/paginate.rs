//! Offset pagination
//!
//! List endpoints are read page by page: request at offset 0, append the
//! items, advance the offset by the number of items received, and stop on
//! the first empty page. The page bound guards against an API that never
//! returns an empty page.

use super::extract::list_or_empty;
use super::fetch::fetch;
use super::request::RequestDescriptor;
use crate::cloud::client::WafClient;
use crate::error::{Result, WafError};
use serde_json::Value;
use std::future::Future;

/// Query parameter carrying the page offset
pub const OFFSET_PARAM: &str = "offset";

/// Drive `fetch_page` from offset 0 until it returns an empty page.
///
/// At most `max_pages` non-empty pages are accepted; one more non-empty page
/// aborts with [`WafError::PaginationLimit`].
pub async fn paginate_offset<F, Fut>(max_pages: usize, mut fetch_page: F) -> Result<Vec<Value>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    let mut all_items = Vec::new();
    let mut offset = 0usize;
    let mut pages = 0usize;

    loop {
        let items = fetch_page(offset).await?;
        if items.is_empty() {
            tracing::debug!("pagination finished: {} items in {} pages", all_items.len(), pages);
            return Ok(all_items);
        }

        if pages == max_pages {
            tracing::warn!(
                "pagination stopped at offset {} after {} pages without an empty page",
                offset,
                pages
            );
            return Err(WafError::PaginationLimit { pages, offset });
        }

        pages += 1;
        offset += items.len();
        all_items.extend(items);
    }
}

/// Fetch every item of a list endpoint.
///
/// `items_path` locates the array in each page (e.g. `items`).
pub async fn fetch_all(
    client: &WafClient,
    request: &RequestDescriptor,
    items_path: &str,
    operation: &str,
) -> Result<Vec<Value>> {
    paginate_offset(client.max_pages, |offset| {
        let page = request.clone().set_query(OFFSET_PARAM, offset);
        async move {
            let body = fetch(client, &page, operation).await?;
            Ok(list_or_empty(&body, items_path))
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    fn pages(sizes: &[usize]) -> Vec<Vec<Value>> {
        let mut next = 0;
        sizes
            .iter()
            .map(|&n| {
                let page = (next..next + n).map(|i| json!({ "id": i })).collect();
                next += n;
                page
            })
            .collect()
    }

    #[tokio::test]
    async fn test_concatenates_until_empty_page() {
        let pages = pages(&[2, 3, 1]);
        let offsets = RefCell::new(Vec::new());

        let items = paginate_offset(10, |offset| {
            offsets.borrow_mut().push(offset);
            let idx = offsets.borrow().len() - 1;
            let page = pages.get(idx).cloned().unwrap_or_default();
            async move { Ok(page) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 6);
        assert_eq!(items[5]["id"], 5);
        assert_eq!(*offsets.borrow(), vec![0, 2, 5, 6]);
    }

    #[tokio::test]
    async fn test_first_page_empty() {
        let items = paginate_offset(10, |_| async { Ok(Vec::new()) }).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_exactly_max_pages_is_allowed() {
        let pages = pages(&[1, 1]);
        let items = paginate_offset(2, |offset| {
            let page = pages.get(offset).cloned().unwrap_or_default();
            async move { Ok(page) }
        })
        .await
        .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_never_ending_pages_hit_the_bound() {
        let err = paginate_offset(3, |_| async { Ok(vec![json!({"id": "same"})]) })
            .await
            .unwrap_err();

        assert!(matches!(err, WafError::PaginationLimit { pages: 3, offset: 3 }));
    }

    #[tokio::test]
    async fn test_page_error_aborts() {
        let err = paginate_offset(3, |offset| async move {
            if offset == 0 {
                Ok(vec![json!({"id": 0})])
            } else {
                Err(WafError::NoResults)
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, WafError::NoResults));
    }
}
