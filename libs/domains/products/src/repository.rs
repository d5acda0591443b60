use async_trait::async_trait;

use crate::error::ProductResult;
use crate::models::Product;
use crate::query::{FieldFilter, StoreQuery};

/// Read access to the product catalogue.
///
/// Implementations translate [`StoreQuery`] into their backend's filtered,
/// ordered, limited range read. Failures surface as
/// [`ProductError::StoreUnavailable`](crate::error::ProductError::StoreUnavailable).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Up to `query.limit` products matching the filters, in order, strictly
    /// after `query.start_after` when set
    async fn find(&self, query: &StoreQuery) -> ProductResult<Vec<Product>>;

    /// Number of products matching the filters
    async fn count(&self, filters: &[FieldFilter]) -> ProductResult<u64>;

    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>>;

    /// Category names from the catalogue's category list, if one is stored
    async fn list_categories(&self) -> ProductResult<Option<Vec<String>>>;
}
