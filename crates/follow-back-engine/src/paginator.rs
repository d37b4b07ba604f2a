//! Cursor pagination.

use std::future::Future;
use tracing::debug;

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` or empty when the listing is exhausted.
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
        Self { items, cursor }
    }

    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
        }
    }
}

/// Fetch every page of a listing and concatenate the items in server order.
///
/// Starts with no cursor and stops on the first page that is empty or carries
/// no cursor, so a server that keeps returning a cursor on empty pages cannot
/// loop forever. No deduplication is done. The first error is returned and
/// everything fetched so far is dropped.
pub async fn fetch_all<T, E, F, Fut>(list: &str, mut step: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page = 0u32;

    loop {
        let Page {
            items: batch,
            cursor: next,
        } = step(cursor.take()).await?;
        page += 1;

        debug!(list = %list, page, count = batch.len(), "Fetched page");

        let exhausted = batch.is_empty();
        items.extend(batch);

        match next.filter(|c| !c.is_empty()) {
            Some(next) if !exhausted => cursor = Some(next),
            _ => break,
        }
    }

    debug!(list = %list, pages = page, total = items.len(), "Listing exhausted");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn page(items: &[u32], cursor: Option<&str>) -> Page<u32> {
        Page::new(items.to_vec(), cursor.map(String::from))
    }

    #[tokio::test]
    async fn test_concatenates_pages_in_order() {
        let pages = RefCell::new(vec![
            page(&[1, 2], Some("c1")),
            page(&[3], Some("c2")),
            page(&[4, 5], None),
        ]);
        let seen = RefCell::new(Vec::new());

        let all = fetch_all::<_, (), _, _>("test", |cursor| {
            seen.borrow_mut().push(cursor);
            let next = pages.borrow_mut().remove(0);
            async move { Ok(next) }
        })
        .await
        .unwrap();

        assert_eq!(all, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *seen.borrow(),
            vec![None, Some("c1".to_string()), Some("c2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stops_on_empty_page_even_with_cursor() {
        let calls = RefCell::new(0);

        let all = fetch_all::<u32, (), _, _>("test", |_| {
            *calls.borrow_mut() += 1;
            let n = *calls.borrow();
            async move {
                Ok(if n == 1 {
                    page(&[1], Some("c1"))
                } else {
                    page(&[], Some("forever"))
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(all, vec![1]);
        assert_eq!(*calls.borrow(), 2);
    }

    #[tokio::test]
    async fn test_empty_string_cursor_ends_listing() {
        let calls = RefCell::new(0);

        let all = fetch_all::<u32, (), _, _>("test", |_| {
            *calls.borrow_mut() += 1;
            async { Ok(page(&[7, 8], Some(""))) }
        })
        .await
        .unwrap();

        assert_eq!(all, vec![7, 8]);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn test_does_not_deduplicate() {
        let pages = RefCell::new(vec![page(&[1, 2], Some("c1")), page(&[2, 1], None)]);

        let all = fetch_all::<_, (), _, _>("test", |_| {
            let next = pages.borrow_mut().remove(0);
            async move { Ok(next) }
        })
        .await
        .unwrap();

        assert_eq!(all, vec![1, 2, 2, 1]);
    }

    #[tokio::test]
    async fn test_error_discards_partial_results() {
        let calls = RefCell::new(0);

        let result = fetch_all::<u32, &str, _, _>("test", |_| {
            *calls.borrow_mut() += 1;
            let n = *calls.borrow();
            async move {
                if n < 3 {
                    Ok(page(&[n], Some("more")))
                } else {
                    Err("boom")
                }
            }
        })
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(*calls.borrow(), 3);
    }
}
