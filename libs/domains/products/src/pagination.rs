//! Page fetching over a [`ProductRepository`].
//!
//! Page `N` starts strictly after the last item of page `N - 1`. Where that
//! item is found is decided by a [`CursorResolver`]: the default
//! [`PrefixRescan`] re-reads the `(N - 1) * pageSize` items before the page.
//! A full page also carries a `nextCursor` token that lets the following
//! request skip the rescan.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ProductError, ProductResult};
use crate::models::ProductPage;
use crate::query::{apply_search, Cursor, QueryDescriptor, SortKey};
use crate::repository::ProductRepository;

/// Validated page coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
    cursor: Option<String>,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> ProductResult<Self> {
        if page_size <= 0 {
            return Err(ProductError::invalid(format!(
                "pageSize must be a positive integer, got {page_size}"
            )));
        }
        if page < 1 {
            return Err(ProductError::invalid(format!(
                "page must be at least 1, got {page}"
            )));
        }

        Ok(Self {
            page: page as u64,
            page_size: page_size as u64,
            cursor: None,
        })
    }

    /// Start after a `nextCursor` token instead of rescanning.
    pub fn with_cursor(mut self, token: Option<String>) -> Self {
        self.cursor = token;
        self
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

/// Where a page begins in the ordered result set
#[derive(Debug, Clone, PartialEq)]
pub enum PageStart {
    First,
    After(Cursor),
    /// Past the last matching item; the page is empty
    Beyond,
}

/// Locates the start of a page.
#[async_trait]
pub trait CursorResolver: Send + Sync {
    async fn resolve(
        &self,
        repository: &dyn ProductRepository,
        descriptor: &QueryDescriptor,
        page: u64,
        page_size: u64,
    ) -> ProductResult<PageStart>;
}

/// Reads the whole prefix before the page and takes its last item.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixRescan;

#[async_trait]
impl CursorResolver for PrefixRescan {
    async fn resolve(
        &self,
        repository: &dyn ProductRepository,
        descriptor: &QueryDescriptor,
        page: u64,
        page_size: u64,
    ) -> ProductResult<PageStart> {
        if page <= 1 {
            return Ok(PageStart::First);
        }

        let Some(skip) = (page - 1).checked_mul(page_size) else {
            return Ok(PageStart::Beyond);
        };

        let prefix = repository.find(&descriptor.store_query(skip, None)).await?;
        if (prefix.len() as u64) < skip {
            tracing::debug!(page, skip, found = prefix.len(), "page is past the end");
            return Ok(PageStart::Beyond);
        }

        Ok(prefix
            .last()
            .map(|last| PageStart::After(Cursor::from_product(last, descriptor.sort)))
            .unwrap_or(PageStart::Beyond))
    }
}

/// Wire form of a persisted cursor
#[derive(Debug, Serialize, Deserialize)]
struct CursorToken {
    #[serde(rename = "s")]
    sort: SortKey,
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(rename = "p", default, skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(rename = "i")]
    id: String,
}

/// Encode `cursor` as an opaque token bound to the descriptor's sort and
/// category.
pub fn encode_cursor(descriptor: &QueryDescriptor, cursor: &Cursor) -> ProductResult<String> {
    let token = CursorToken {
        sort: descriptor.sort,
        category: descriptor.category().map(str::to_owned),
        price: cursor.price,
        id: cursor.id.clone(),
    };
    let json = serde_json::to_vec(&token)
        .map_err(|e| ProductError::Internal(format!("cursor encoding failed: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token issued by [`encode_cursor`] for the same listing.
pub fn decode_cursor(descriptor: &QueryDescriptor, token: &str) -> ProductResult<Cursor> {
    let malformed = || ProductError::invalid("cursor is malformed");

    let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| malformed())?;
    let token: CursorToken = serde_json::from_slice(&bytes).map_err(|_| malformed())?;

    if token.sort != descriptor.sort {
        return Err(ProductError::invalid(format!(
            "cursor was issued for sort '{}', not '{}'",
            token.sort, descriptor.sort
        )));
    }
    if token.category.as_deref() != descriptor.category() {
        return Err(ProductError::invalid(
            "cursor was issued for a different category",
        ));
    }
    if descriptor.sort.is_price() && token.price.is_none() {
        return Err(malformed());
    }

    Ok(Cursor {
        price: token.price,
        id: token.id,
    })
}

/// Runs the count, resolves the page start and fetches one page.
pub struct PageFetcher<R> {
    repository: Arc<R>,
    resolver: Arc<dyn CursorResolver>,
}

impl<R> Clone for PageFetcher<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R: ProductRepository> PageFetcher<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            resolver: Arc::new(PrefixRescan),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn CursorResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// One page of the descriptor's result set.
    ///
    /// `total` counts every match of the filters; `search` narrows only the
    /// returned items. Out-of-range pages come back empty. A cursor token
    /// replaces the page offset; the response still reports the requested
    /// `page`.
    pub async fn fetch_page(
        &self,
        descriptor: &QueryDescriptor,
        request: &PageRequest,
    ) -> ProductResult<ProductPage> {
        let (page, page_size) = (request.page(), request.page_size());

        let total = self.repository.count(&descriptor.filters).await?;

        let start = match request.cursor() {
            Some(token) => PageStart::After(decode_cursor(descriptor, token)?),
            None => {
                self.resolver
                    .resolve(self.repository.as_ref(), descriptor, page, page_size)
                    .await?
            }
        };

        let start_after = match start {
            PageStart::First => None,
            PageStart::After(cursor) => Some(cursor),
            PageStart::Beyond => return Ok(ProductPage::empty(total, page, page_size)),
        };

        let fetched = self
            .repository
            .find(&descriptor.store_query(page_size, start_after))
            .await?;

        let next_cursor = match fetched.last() {
            Some(last) if fetched.len() as u64 == page_size => Some(encode_cursor(
                descriptor,
                &Cursor::from_product(last, descriptor.sort),
            )?),
            _ => None,
        };

        let products = apply_search(fetched, descriptor.search.as_deref());
        tracing::debug!(page, page_size, total, returned = products.len(), "page fetched");

        Ok(ProductPage {
            products,
            total,
            page,
            page_size,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProductRepository;
    use crate::models::{Product, ProductData};
    use crate::query::{compose, ProductQuery};

    const CATEGORIES: [&str; 3] = ["beauty", "furniture", "groceries"];

    /// 45 products, prices repeating every 7 so that price ties occur.
    fn catalogue() -> Arc<InMemoryProductRepository> {
        let products = (1..=45).map(|n| {
            Product::new(
                format!("{n:03}"),
                ProductData {
                    title: format!("Product {n}"),
                    price: 1.0 + (n % 7) as f64,
                    category: CATEGORIES[n % 3].to_string(),
                    ..Default::default()
                },
            )
        });
        Arc::new(InMemoryProductRepository::with_products(products))
    }

    async fn fetch(
        fetcher: &PageFetcher<InMemoryProductRepository>,
        query: &ProductQuery,
    ) -> ProductResult<ProductPage> {
        let request = PageRequest::new(query.page, query.page_size)?.with_cursor(query.cursor.clone());
        fetcher.fetch_page(&compose(query), &request).await
    }

    fn ids(page: &ProductPage) -> Vec<String> {
        page.products.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_page_request_rejects_non_positive_size() {
        for size in [0, -1, -20] {
            let err = PageRequest::new(1, size).unwrap_err();
            assert!(matches!(err, ProductError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_page_request_rejects_non_positive_page() {
        for page in [0, -1, i64::MIN] {
            assert!(matches!(
                PageRequest::new(page, 20).unwrap_err(),
                ProductError::InvalidArgument(_)
            ));
        }
    }

    #[tokio::test]
    async fn test_45_products_paginate_20_20_5_0() {
        let fetcher = PageFetcher::new(catalogue());

        let mut sizes = Vec::new();
        for page in 1..=4 {
            let result = fetch(&fetcher, &ProductQuery::new().page(page).page_size(20))
                .await
                .unwrap();
            assert_eq!(result.total, 45);
            assert_eq!(result.page, page as u64);
            sizes.push(result.products.len());
        }

        assert_eq!(sizes, vec![20, 20, 5, 0]);
    }

    #[tokio::test]
    async fn test_pages_concatenate_to_full_order() {
        let fetcher = PageFetcher::new(catalogue());
        let base = ProductQuery::new().sort(SortKey::PriceAscending).page_size(7);

        let everything = fetch(&fetcher, &base.clone().page_size(100)).await.unwrap();

        let mut concatenated = Vec::new();
        for page in 1..=7 {
            let result = fetch(&fetcher, &base.clone().page(page)).await.unwrap();
            concatenated.extend(ids(&result));
        }

        assert_eq!(concatenated, ids(&everything));
        assert_eq!(concatenated.len(), 45);
    }

    #[tokio::test]
    async fn test_total_is_invariant_across_pages() {
        let fetcher = PageFetcher::new(catalogue());
        let query = ProductQuery::new().category("beauty").page_size(4);

        let mut totals = Vec::new();
        for page in 1..=6 {
            totals.push(fetch(&fetcher, &query.clone().page(page)).await.unwrap().total);
        }

        assert!(totals.iter().all(|t| *t == 15));
    }

    #[tokio::test]
    async fn test_descending_is_exact_reverse_of_ascending() {
        let fetcher = PageFetcher::new(catalogue());
        let query = ProductQuery::new().page_size(45);

        let asc = fetch(&fetcher, &query.clone().sort(SortKey::PriceAscending))
            .await
            .unwrap();
        let desc = fetch(&fetcher, &query.sort(SortKey::PriceDescending))
            .await
            .unwrap();

        let mut reversed = ids(&desc);
        reversed.reverse();
        assert_eq!(ids(&asc), reversed);
    }

    #[tokio::test]
    async fn test_default_order_is_id_descending() {
        let fetcher = PageFetcher::new(catalogue());
        let page = fetch(&fetcher, &ProductQuery::new().page_size(3)).await.unwrap();
        assert_eq!(ids(&page), vec!["045", "044", "043"]);
    }

    #[tokio::test]
    async fn test_far_page_is_empty_not_error() {
        let fetcher = PageFetcher::new(catalogue());
        let page = fetch(&fetcher, &ProductQuery::new().page(i64::MAX).page_size(i64::MAX))
            .await
            .unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.total, 45);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_zero_matches() {
        let fetcher = PageFetcher::new(catalogue());
        let page = fetch(&fetcher, &ProductQuery::new().category("laptops"))
            .await
            .unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_following_tokens_matches_rescan() {
        let fetcher = PageFetcher::new(catalogue());
        let base = ProductQuery::new()
            .category("groceries")
            .sort(SortKey::PriceDescending)
            .page_size(4);

        let mut via_tokens = Vec::new();
        let mut via_rescan = Vec::new();
        let mut token: Option<String> = None;
        for page in 1..=4 {
            let mut query = base.clone().page(page);
            query.cursor = token.clone();
            let followed = fetch(&fetcher, &query).await.unwrap();
            let rescanned = fetch(&fetcher, &base.clone().page(page)).await.unwrap();

            assert_eq!(followed, rescanned);
            via_tokens.extend(ids(&followed));
            via_rescan.extend(ids(&rescanned));
            token = followed.next_cursor;
        }

        assert_eq!(via_tokens, via_rescan);
        assert_eq!(via_tokens.len(), 15);
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_next_cursor_only_on_full_pages() {
        let fetcher = PageFetcher::new(catalogue());
        let query = ProductQuery::new().page_size(20);

        assert!(fetch(&fetcher, &query.clone().page(2)).await.unwrap().next_cursor.is_some());
        assert!(fetch(&fetcher, &query.page(3)).await.unwrap().next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_token_from_another_sort_is_rejected() {
        let fetcher = PageFetcher::new(catalogue());
        let first = fetch(&fetcher, &ProductQuery::new().sort(SortKey::PriceAscending).page_size(5))
            .await
            .unwrap();
        let token = first.next_cursor.unwrap();

        let err = fetch(
            &fetcher,
            &ProductQuery::new()
                .sort(SortKey::PriceDescending)
                .page(2)
                .page_size(5)
                .cursor(token),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProductError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_token_from_another_category_is_rejected() {
        let fetcher = PageFetcher::new(catalogue());
        let first = fetch(&fetcher, &ProductQuery::new().category("beauty").page_size(5))
            .await
            .unwrap();
        let token = first.next_cursor.unwrap();

        let err = fetch(
            &fetcher,
            &ProductQuery::new().category("furniture").page(2).page_size(5).cursor(token),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProductError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let fetcher = PageFetcher::new(catalogue());
        let err = fetch(&fetcher, &ProductQuery::new().cursor("not a token!"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_search_narrows_page_but_not_total() {
        let fetcher = PageFetcher::new(catalogue());
        // Page 1 holds 045..026; only 040..045 match there.
        let page = fetch(&fetcher, &ProductQuery::new().search("product 4").page_size(20))
            .await
            .unwrap();

        assert_eq!(page.total, 45);
        assert_eq!(ids(&page), vec!["045", "044", "043", "042", "041", "040"]);
        assert!(page.next_cursor.is_some());
    }

    struct AlwaysBeyond;

    #[async_trait]
    impl CursorResolver for AlwaysBeyond {
        async fn resolve(
            &self,
            _repository: &dyn ProductRepository,
            _descriptor: &QueryDescriptor,
            _page: u64,
            _page_size: u64,
        ) -> ProductResult<PageStart> {
            Ok(PageStart::Beyond)
        }
    }

    #[tokio::test]
    async fn test_custom_resolver_is_used() {
        let fetcher = PageFetcher::new(catalogue()).with_resolver(Arc::new(AlwaysBeyond));
        let page = fetch(&fetcher, &ProductQuery::new()).await.unwrap();
        assert!(page.products.is_empty());
        assert_eq!(page.total, 45);
    }
}
