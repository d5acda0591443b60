//! Query composition: user criteria in, store-agnostic descriptor out.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductListParams};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Listing order requested by the client
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortKey {
    /// Newest id first
    #[default]
    Default,
    #[strum(to_string = "price-ascending", serialize = "price-asc")]
    PriceAscending,
    #[strum(to_string = "price-descending", serialize = "price-desc")]
    PriceDescending,
}

impl SortKey {
    /// Parse a wire value; blank or unknown values mean [`SortKey::Default`].
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => SortKey::Default,
            Some(value) => SortKey::from_str(value).unwrap_or_else(|_| {
                tracing::debug!(sort = value, "unknown sort value, using default order");
                SortKey::Default
            }),
        }
    }

    /// Store ordering. Price orders break ties on id in the same direction,
    /// so descending is the exact reverse of ascending.
    pub fn order_keys(self) -> Vec<OrderKey> {
        match self {
            SortKey::Default => vec![OrderKey::desc(SortField::Id)],
            SortKey::PriceAscending => {
                vec![OrderKey::asc(SortField::Price), OrderKey::asc(SortField::Id)]
            }
            SortKey::PriceDescending => {
                vec![OrderKey::desc(SortField::Price), OrderKey::desc(SortField::Id)]
            }
        }
    }

    pub fn is_price(self) -> bool {
        matches!(self, SortKey::PriceAscending | SortKey::PriceDescending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Orient a natural ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Category,
}

/// Equality predicate on a stored field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn category(value: impl Into<String>) -> Self {
        Self {
            field: FilterField::Category,
            value: value.into(),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match self.field {
            FilterField::Category => product.data.category == self.value,
        }
    }
}

/// Sort-key value of a document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Price(f64),
    Id(&'a str),
}

impl SortValue<'_> {
    fn cmp_natural(&self, other: &SortValue<'_>) -> Ordering {
        match (self, other) {
            (SortValue::Price(a), SortValue::Price(b)) => a.total_cmp(b),
            (SortValue::Id(a), SortValue::Id(b)) => a.cmp(b),
            (SortValue::Price(_), SortValue::Id(_)) => Ordering::Less,
            (SortValue::Id(_), SortValue::Price(_)) => Ordering::Greater,
        }
    }
}

/// Sort-key values of the last document of the preceding page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub id: String,
}

impl Cursor {
    /// Capture the keys `sort` orders by.
    pub fn from_product(product: &Product, sort: SortKey) -> Self {
        Self {
            price: sort.is_price().then_some(product.data.price),
            id: product.id.clone(),
        }
    }

    pub fn value(&self, field: SortField) -> ProductResult<SortValue<'_>> {
        match field {
            SortField::Id => Ok(SortValue::Id(&self.id)),
            SortField::Price => self
                .price
                .map(SortValue::Price)
                .ok_or_else(|| ProductError::invalid("cursor does not carry a price")),
        }
    }
}

/// Value of `field` on a product
pub fn sort_value(product: &Product, field: SortField) -> SortValue<'_> {
    match field {
        SortField::Price => SortValue::Price(product.data.price),
        SortField::Id => SortValue::Id(&product.id),
    }
}

/// Compare two products under `order`.
pub fn compare_products(a: &Product, b: &Product, order: &[OrderKey]) -> Ordering {
    order
        .iter()
        .map(|key| {
            key.direction
                .apply(sort_value(a, key.field).cmp_natural(&sort_value(b, key.field)))
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Whether `product` sorts strictly after `cursor` under `order`.
pub fn is_after(product: &Product, cursor: &Cursor, order: &[OrderKey]) -> ProductResult<bool> {
    for key in order {
        let bound = cursor.value(key.field)?;
        let ordering = key
            .direction
            .apply(sort_value(product, key.field).cmp_natural(&bound));
        if ordering.is_ne() {
            return Ok(ordering.is_gt());
        }
    }
    Ok(false)
}

/// A range read against the document store
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub filters: Vec<FieldFilter>,
    pub order: Vec<OrderKey>,
    /// Always positive
    pub limit: u64,
    /// Exclusive lower bound in `order`
    pub start_after: Option<Cursor>,
}

/// User criteria for one listing request
#[derive(Debug, Clone, PartialEq)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: SortKey,
    pub page: i64,
    pub page_size: i64,
    pub cursor: Option<String>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            sort: SortKey::Default,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            cursor: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize wire parameters; blank strings count as absent.
    pub fn from_params(params: ProductListParams, default_page_size: i64) -> Self {
        Self {
            search: non_blank(params.search),
            category: non_blank(params.category),
            sort: SortKey::from_wire(params.sort.as_deref()),
            page: params.page.unwrap_or(1),
            page_size: params.page_size.unwrap_or(default_page_size),
            cursor: non_blank(params.cursor),
        }
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = non_blank(Some(search.into()));
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = non_blank(Some(category.into()));
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn cursor(mut self, token: impl Into<String>) -> Self {
        self.cursor = non_blank(Some(token.into()));
        self
    }
}

/// Filters and ordering for the store, plus the search term applied after
/// the fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub filters: Vec<FieldFilter>,
    pub sort: SortKey,
    pub order: Vec<OrderKey>,
    /// Not pushed to the store; narrows only the fetched page
    pub search: Option<String>,
}

impl QueryDescriptor {
    /// Store read of `limit` documents after `start_after`.
    pub fn store_query(&self, limit: u64, start_after: Option<Cursor>) -> StoreQuery {
        StoreQuery {
            filters: self.filters.clone(),
            order: self.order.clone(),
            limit,
            start_after,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.field == FilterField::Category)
            .map(|f| f.value.as_str())
    }
}

/// Build the descriptor for `query`. Pure; pagination is validated later.
pub fn compose(query: &ProductQuery) -> QueryDescriptor {
    QueryDescriptor {
        filters: query
            .category
            .iter()
            .map(|c| FieldFilter::category(c.as_str()))
            .collect(),
        sort: query.sort,
        order: query.sort.order_keys(),
        search: query.search.clone(),
    }
}

/// Keep products whose title contains `term`, ignoring case.
pub fn apply_search(products: Vec<Product>, term: Option<&str>) -> Vec<Product> {
    let Some(term) = term.map(str::to_lowercase) else {
        return products;
    };

    products
        .into_iter()
        .filter(|p| p.data.title.to_lowercase().contains(&term))
        .collect()
}
