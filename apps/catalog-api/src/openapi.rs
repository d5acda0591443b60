//! OpenAPI documentation configuration

use axum_helpers::{ErrorResponse, HealthResponse};
use utoipa::OpenApi;

/// Combined OpenAPI documentation for Catalog API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Product catalogue: category filter, price sort and cursor pagination",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_products::ApiDoc)
    ),
    components(schemas(ErrorResponse, HealthResponse)),
    tags(
        (name = "Products", description = "Catalogue listing and lookup")
    )
)]
pub struct ApiDoc;
