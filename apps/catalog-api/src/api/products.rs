//! Products API routes

use axum::Router;
use domain_products::{handlers, MongoProductRepository, ProductService};

use crate::state::AppState;

fn repository(state: &AppState) -> MongoProductRepository {
    let catalog = &state.config.catalog;
    MongoProductRepository::with_collections(
        &state.db,
        &catalog.products_collection,
        &catalog.categories_collection,
    )
}

/// Create products router
pub fn router(state: &AppState) -> Router {
    let repository = repository(state);
    let service = ProductService::new(repository).with_settings(state.config.catalog.settings());
    handlers::router(service)
}

/// Initialize products indexes
pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    repository(state).init_indexes().await?;
    Ok(())
}
