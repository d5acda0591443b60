use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// A catalogue entry as returned by the API: the document id plus every
/// other stored field under `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Document id, zero-padded (e.g. "007")
    pub id: String,
    pub data: ProductData,
}

impl Product {
    pub fn new(id: impl Into<String>, data: ProductData) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Stored product fields. Sparse documents deserialize with defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub category: String,
    /// 0 to 5
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub stock: i64,
    /// Image URLs in display order
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_information: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_order_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProductMeta>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    /// ISO-8601, as written by the importer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    /// At most `pageSize` items, already narrowed by `search`
    pub products: Vec<Product>,
    /// Matches for the category filter, counted before `search` is applied
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    /// Opaque token for the following page; present only on full pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl ProductPage {
    pub fn empty(total: u64, page: u64, page_size: u64) -> Self {
        Self {
            products: Vec::new(),
            total,
            page,
            page_size,
            next_cursor: None,
        }
    }
}

/// Query string of `GET /api/products`.
///
/// Numbers stay signed so that `pageSize=-1` reaches the domain check and
/// is reported as an invalid argument rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Case-insensitive substring of the title, applied to the fetched page
    #[validate(length(max = 200))]
    pub search: Option<String>,
    /// Exact category name
    #[validate(length(max = 100))]
    pub category: Option<String>,
    /// `price-asc`, `price-desc` or `default`; anything else means default
    pub sort: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<i64>,
    /// Items per page (default 20)
    pub page_size: Option<i64>,
    /// `nextCursor` from the previous page. When present it alone decides
    /// where the page starts; `page` is echoed back unchecked.
    #[validate(length(max = 1024))]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}
