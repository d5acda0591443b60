//! Products Domain
//!
//! Read-only product catalogue: category filter, price ordering, paginated
//! listing, lookup by id and the category list, backed by MongoDB.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Limits, query normalization
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Query/Pages │  ← compose(), PageFetcher, CursorResolver
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB / in-memory)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, MongoProductRepository, ProductService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = ProductService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod service;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use memory::InMemoryProductRepository;
pub use models::{CategoriesResponse, Product, ProductData, ProductListParams, ProductPage};
pub use mongodb::MongoProductRepository;
pub use pagination::{CursorResolver, PageFetcher, PageRequest, PageStart, PrefixRescan};
pub use query::{apply_search, compose, ProductQuery, QueryDescriptor, SortKey};
pub use repository::ProductRepository;
pub use service::{CatalogSettings, ProductService};
