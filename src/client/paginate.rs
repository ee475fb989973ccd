use std::future::Future;

use tracing::debug;

use crate::client::SitehostError;
use crate::transport::Page;

/// Fetch pages until the server reports no more, appending into `items`.
///
/// The first request omits the page number and relies on the server default;
/// later requests ask for page 2, 3, … explicitly. The first error aborts the
/// walk and leaves whatever was already collected in `items`.
pub(crate) async fn paginate<T, F, Fut>(items: &mut Vec<T>, mut fetch: F) -> Result<(), SitehostError>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>, SitehostError>>,
{
    let mut requested = None;
    loop {
        let page = fetch(requested).await?;
        let current = requested.unwrap_or(1);
        debug!(page = current, total_pages = page.total_pages, "fetched page");
        items.extend(page.items);

        if current >= page.total_pages {
            return Ok(());
        }
        requested = Some(current + 1);
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use super::*;

    fn page(total_pages: u32, items: Vec<u32>) -> Page<u32> {
        Page { total_pages, items }
    }

    #[tokio::test]
    async fn single_page_is_fetched_once_without_page_number() {
        let mut calls = Vec::new();
        let mut items = Vec::new();
        paginate(&mut items, |requested| {
            calls.push(requested);
            ready(Ok(page(1, vec![7])))
        })
        .await
        .unwrap();

        assert_eq!(calls, vec![None]);
        assert_eq!(items, vec![7]);
    }

    #[tokio::test]
    async fn walks_every_page_reported_by_the_server() {
        let mut calls = Vec::new();
        let mut items = Vec::new();
        paginate(&mut items, |requested| {
            calls.push(requested);
            let current = requested.unwrap_or(1);
            ready(Ok(page(5, (0..current - 1).collect())))
        })
        .await
        .unwrap();

        assert_eq!(calls, vec![None, Some(2), Some(3), Some(4), Some(5)]);
        assert_eq!(items.len(), 10);
    }

    #[tokio::test]
    async fn total_pages_may_change_between_responses() {
        let mut calls = Vec::new();
        let mut items = Vec::new();
        paginate(&mut items, |requested| {
            calls.push(requested);
            let total = if requested.is_none() { 2 } else { 3 };
            ready(Ok(page(total, vec![1])))
        })
        .await
        .unwrap();

        assert_eq!(calls, vec![None, Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn zero_total_pages_stops_after_first_request() {
        let mut calls = 0;
        let mut items: Vec<u32> = Vec::new();
        paginate(&mut items, |_| {
            calls += 1;
            ready(Ok(page(0, Vec::new())))
        })
        .await
        .unwrap();
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn error_on_third_page_keeps_collected_items() {
        let mut calls = Vec::new();
        let mut items = Vec::new();
        let result = paginate(&mut items, |requested| {
            calls.push(requested);
            ready(match requested {
                Some(3) => Err(SitehostError::Api {
                    message: "Rate limited.".to_owned(),
                }),
                _ => Ok(page(5, vec![requested.unwrap_or(1)])),
            })
        })
        .await;

        assert!(matches!(result, Err(SitehostError::Api { .. })));
        assert_eq!(calls, vec![None, Some(2), Some(3)]);
        assert_eq!(items, vec![1, 2]);
    }
}
