//! HTTP handlers for the catalogue API

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use axum_helpers::{
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
    ValidatedQuery,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    CategoriesResponse, Dimensions, Product, ProductData, ProductListParams, ProductMeta,
    ProductPage,
};
use crate::query::SortKey;
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the catalogue API
#[derive(OpenApi)]
#[openapi(
    paths(list_products, list_categories, get_product),
    components(
        schemas(
            Product, ProductData, Dimensions, ProductMeta, ProductPage,
            CategoriesResponse, SortKey
        ),
        responses(BadRequestResponse, NotFoundResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = "Products", description = "Catalogue listing and lookup")
    )
)]
pub struct ApiDoc;

/// Catalogue routes, to be nested under `/api/products`
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products))
        .route("/categories", get(list_categories))
        .route("/{id}", get(get_product))
        .with_state(shared_service)
}

/// One page of products, optionally filtered by category and sorted by price.
///
/// `total` counts every product in the category; `search` only narrows the
/// returned page.
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductListParams),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ValidatedQuery(params): ValidatedQuery<ProductListParams>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.list_products(params).await?;
    Ok(Json(page))
}

/// Every category name
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Products",
    responses(
        (status = 200, description = "Category names", body = CategoriesResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<CategoriesResponse>> {
    let categories = service.list_categories().await?;
    Ok(Json(CategoriesResponse { categories }))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product id, e.g. \"007\"")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}
