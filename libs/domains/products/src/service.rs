//! Product Service - catalogue queries

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductListParams, ProductPage};
use crate::pagination::{CursorResolver, PageFetcher, PageRequest};
use crate::query::{compose, ProductQuery, DEFAULT_PAGE_SIZE};
use crate::repository::ProductRepository;

/// Listing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Used when the request has no `pageSize`
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 100,
        }
    }
}

/// Read-only catalogue operations over a [`ProductRepository`].
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    fetcher: PageFetcher<R>,
    settings: CatalogSettings,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            fetcher: self.fetcher.clone(),
            settings: self.settings,
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        let repository = Arc::new(repository);
        Self {
            fetcher: PageFetcher::new(Arc::clone(&repository)),
            repository,
            settings: CatalogSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: CatalogSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Swap the strategy that locates pages after the first
    pub fn with_resolver(mut self, resolver: Arc<dyn CursorResolver>) -> Self {
        self.fetcher = self.fetcher.with_resolver(resolver);
        self
    }

    pub fn settings(&self) -> CatalogSettings {
        self.settings
    }

    /// List products from raw query-string parameters
    #[instrument(skip(self))]
    pub async fn list_products(&self, params: ProductListParams) -> ProductResult<ProductPage> {
        params
            .validate()
            .map_err(|e| ProductError::invalid(e.to_string()))?;

        self.list(ProductQuery::from_params(
            params,
            self.settings.default_page_size,
        ))
        .await
    }

    /// One page of products for `query`
    #[instrument(skip(self), fields(sort = %query.sort, page = query.page, page_size = query.page_size))]
    pub async fn list(&self, query: ProductQuery) -> ProductResult<ProductPage> {
        if query.page_size > self.settings.max_page_size {
            return Err(ProductError::invalid(format!(
                "pageSize must be at most {}, got {}",
                self.settings.max_page_size, query.page_size
            )));
        }

        let request = PageRequest::new(query.page, query.page_size)?.with_cursor(query.cursor.clone());
        let descriptor = compose(&query);

        self.fetcher.fetch_page(&descriptor, &request).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> ProductResult<Product> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ProductError::invalid("product id must not be blank"));
        }

        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(ProductError::product_not_found)
    }

    /// Category names in stored order
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> ProductResult<Vec<String>> {
        self.repository
            .list_categories()
            .await?
            .ok_or_else(ProductError::categories_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProductRepository;
    use crate::models::ProductData;
    use crate::query::SortKey;
    use crate::repository::MockProductRepository;

    fn product(n: usize) -> Product {
        Product::new(
            format!("{n:03}"),
            ProductData {
                title: format!("Item {n}"),
                price: n as f64,
                category: if n % 2 == 0 { "beauty" } else { "groceries" }.to_string(),
                ..Default::default()
            },
        )
    }

    fn service() -> ProductService<InMemoryProductRepository> {
        let repository = InMemoryProductRepository::with_products((1..=45).map(product))
            .with_categories(vec!["beauty".into(), "groceries".into()]);
        ProductService::new(repository)
    }

    #[tokio::test]
    async fn test_list_products_defaults() {
        let page = service()
            .list_products(ProductListParams::default())
            .await
            .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total, 45);
        assert_eq!(page.products.len(), 20);
        assert_eq!(page.products[0].id, "045");
    }

    #[tokio::test]
    async fn test_list_products_from_wire_params() {
        let params = ProductListParams {
            category: Some("beauty".into()),
            sort: Some("price-asc".into()),
            page: Some(2),
            page_size: Some(5),
            ..Default::default()
        };
        let page = service().list_products(params).await.unwrap();

        let ids: Vec<_> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["012", "014", "016", "018", "020"]);
        assert_eq!(page.total, 22);
    }

    #[tokio::test]
    async fn test_unknown_sort_falls_back_to_default_order() {
        let params = ProductListParams {
            sort: Some("rating".into()),
            page_size: Some(2),
            ..Default::default()
        };
        let page = service().list_products(params).await.unwrap();
        assert_eq!(page.products[0].id, "045");
    }

    #[tokio::test]
    async fn test_page_size_out_of_bounds() {
        let service = service();
        for size in [0, -1, 101] {
            let err = service
                .list(ProductQuery::new().page_size(size))
                .await
                .unwrap_err();
            assert!(matches!(err, ProductError::InvalidArgument(_)), "size {size}");
        }
    }

    #[tokio::test]
    async fn test_max_page_size_is_configurable() {
        let service = service().with_settings(CatalogSettings {
            default_page_size: 10,
            max_page_size: 10,
        });

        assert!(service.list(ProductQuery::new().page_size(11)).await.is_err());
        let page = service
            .list_products(ProductListParams::default())
            .await
            .unwrap();
        assert_eq!(page.page_size, 10);
    }

    #[tokio::test]
    async fn test_price_descending_first_page() {
        let page = service()
            .list(ProductQuery::new().sort(SortKey::PriceDescending).page_size(3))
            .await
            .unwrap();
        let ids: Vec<_> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["045", "044", "043"]);
    }

    #[tokio::test]
    async fn test_get_product() {
        let service = service();

        assert_eq!(service.get_product("007").await.unwrap().data.title, "Item 7");
        assert!(matches!(
            service.get_product("999").await.unwrap_err(),
            ProductError::NotFound(_)
        ));
        assert!(matches!(
            service.get_product("  ").await.unwrap_err(),
            ProductError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn test_list_categories() {
        assert_eq!(
            service().list_categories().await.unwrap(),
            vec!["beauty".to_string(), "groceries".to_string()]
        );

        let empty = ProductService::new(InMemoryProductRepository::new());
        let err = empty.list_categories().await.unwrap_err();
        assert_eq!(err.to_string(), "No categories found");
    }

    #[tokio::test]
    async fn test_count_failure_propagates() {
        let mut mock = MockProductRepository::new();
        mock.expect_count()
            .returning(|_| Err(ProductError::StoreUnavailable("connection refused".into())));
        mock.expect_find().never();

        let err = ProductService::new(mock)
            .list(ProductQuery::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_find_failure_yields_no_partial_page() {
        let mut mock = MockProductRepository::new();
        mock.expect_count().returning(|_| Ok(45));
        mock.expect_find()
            .returning(|_| Err(ProductError::StoreUnavailable("cursor killed".into())));

        let err = ProductService::new(mock)
            .list(ProductQuery::new().page(3))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_first_page_skips_prefix_read() {
        let mut mock = MockProductRepository::new();
        mock.expect_count().times(1).returning(|_| Ok(1));
        mock.expect_find()
            .times(1)
            .withf(|query| query.limit == 20 && query.start_after.is_none())
            .returning(|_| Ok(vec![product(1)]));

        let page = ProductService::new(mock)
            .list(ProductQuery::new())
            .await
            .unwrap();
        assert_eq!(page.products.len(), 1);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_invalid_page_makes_no_store_calls() {
        let mut mock = MockProductRepository::new();
        mock.expect_count().never();
        mock.expect_find().never();

        let err = ProductService::new(mock)
            .list(ProductQuery::new().page(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProductError::InvalidArgument(_)));
    }
}
