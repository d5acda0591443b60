//! Configuration for Catalog API

use core_config::{
    app_info, env_or_default, env_parse_or, server::ServerConfig, AppInfo, ConfigError, FromEnv,
};
use database::mongodb::MongoConfig;
use domain_products::mongodb::{CATEGORIES_COLLECTION, PRODUCTS_COLLECTION};
use domain_products::CatalogSettings;

pub use core_config::Environment;

/// Listing limits and collection names.
///
/// - `CATALOG_DEFAULT_PAGE_SIZE` (20)
/// - `CATALOG_MAX_PAGE_SIZE` (100)
/// - `CATALOG_PRODUCTS_COLLECTION` (products)
/// - `CATALOG_CATEGORIES_COLLECTION` (categories)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub products_collection: String,
    pub categories_collection: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let settings = CatalogSettings::default();
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
            products_collection: PRODUCTS_COLLECTION.to_string(),
            categories_collection: CATEGORIES_COLLECTION.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn settings(&self) -> CatalogSettings {
        CatalogSettings {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

impl FromEnv for CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            default_page_size: env_parse_or("CATALOG_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: env_parse_or("CATALOG_MAX_PAGE_SIZE", defaults.max_page_size)?,
            products_collection: env_or_default(
                "CATALOG_PRODUCTS_COLLECTION",
                &defaults.products_collection,
            ),
            categories_collection: env_or_default(
                "CATALOG_CATEGORIES_COLLECTION",
                &defaults.categories_collection,
            ),
        };

        if config.default_page_size < 1 || config.default_page_size > config.max_page_size {
            return Err(ConfigError::ParseError {
                key: "CATALOG_DEFAULT_PAGE_SIZE".to_string(),
                details: format!(
                    "must be between 1 and CATALOG_MAX_PAGE_SIZE ({}), got {}",
                    config.max_page_size, config.default_page_size
                ),
            });
        }

        Ok(config)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub catalog: CatalogConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let app = app_info!();
        let environment = Environment::from_env();
        let mut mongodb = MongoConfig::from_env()?;
        if mongodb.app_name.is_none() {
            mongodb = mongodb.with_app_name(app.name);
        }
        let server = ServerConfig::from_env()?;
        let catalog = CatalogConfig::from_env()?;

        Ok(Self {
            app,
            mongodb,
            server,
            catalog,
            environment,
        })
    }
}
