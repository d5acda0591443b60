//! In-memory product repository for development and tests

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::error::ProductResult;
use crate::models::Product;
use crate::query::{compare_products, is_after, FieldFilter, StoreQuery};
use crate::repository::ProductRepository;

/// Holds products keyed by id. Orders and range-reads exactly like the
/// MongoDB repository.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: DashMap<String, Product>,
    categories: RwLock<Option<Vec<String>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let repository = Self::new();
        for product in products {
            repository.insert(product);
        }
        repository
    }

    pub fn with_categories(self, categories: Vec<String>) -> Self {
        Self {
            categories: RwLock::new(Some(categories)),
            ..self
        }
    }

    /// Insert or replace a product by id.
    pub fn insert(&self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub async fn set_categories(&self, categories: Vec<String>) {
        *self.categories.write().await = Some(categories);
    }

    fn matching(&self, filters: &[FieldFilter]) -> Vec<Product> {
        self.products
            .iter()
            .filter(|entry| filters.iter().all(|f| f.matches(entry.value())))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find(&self, query: &StoreQuery) -> ProductResult<Vec<Product>> {
        let mut products = self.matching(&query.filters);
        products.sort_by(|a, b| compare_products(a, b, &query.order));

        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        let mut page = Vec::new();
        for product in products {
            if page.len() >= limit {
                break;
            }
            if let Some(cursor) = &query.start_after {
                if !is_after(&product, cursor, &query.order)? {
                    continue;
                }
            }
            page.push(product);
        }

        Ok(page)
    }

    async fn count(&self, filters: &[FieldFilter]) -> ProductResult<u64> {
        Ok(self.matching(filters).len() as u64)
    }

    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        Ok(self.products.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_categories(&self) -> ProductResult<Option<Vec<String>>> {
        Ok(self.categories.read().await.clone())
    }
}
