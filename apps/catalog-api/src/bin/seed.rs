//! Catalog seed
//!
//! Loads a catalogue export (`{ "products": [...], "categories": [...] }`)
//! into MongoDB. Product ids are zero-padded to a common width (at least
//! three digits) so that string order on `_id` matches numeric id order.

use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::Environment;
use database::mongodb::MongoConfig;
use domain_products::{MongoProductRepository, Product, ProductData};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "catalog-seed")]
#[command(about = "Load a product catalogue JSON file into MongoDB")]
struct Cli {
    /// JSON file with `products` and `categories` arrays
    file: PathBuf,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URL")]
    url: String,

    /// Target database
    #[arg(long, env = "MONGODB_DATABASE", default_value = "catalog")]
    database: String,

    /// Leave the stored category list untouched
    #[arg(long)]
    skip_categories: bool,
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    products: Vec<SeedProduct>,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SeedProduct {
    id: Value,
    #[serde(flatten)]
    data: ProductData,
}

/// Minimum id width: `7` becomes `"007"`
const MIN_ID_WIDTH: usize = 3;

fn raw_id(id: &Value) -> Result<String> {
    match id {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        other => eyre::bail!("product id must be a number or a non-empty string, got {other}"),
    }
}

fn padded_id(raw: &str, width: usize) -> String {
    format!("{raw:0>width$}")
}

fn parse_seed(json: &str) -> Result<(Vec<Product>, Vec<String>)> {
    let seed: SeedFile = serde_json::from_str(json).wrap_err("invalid catalogue file")?;

    let raw = seed
        .products
        .iter()
        .map(|p| raw_id(&p.id))
        .collect::<Result<Vec<_>>>()?;
    let width = raw.iter().map(String::len).fold(MIN_ID_WIDTH, usize::max);

    let products = seed
        .products
        .into_iter()
        .zip(raw)
        .map(|(p, id)| Product::new(padded_id(&id, width), p.data))
        .collect();

    Ok((products, seed.categories))
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let cli = Cli::parse();

    let json = std::fs::read_to_string(&cli.file)
        .wrap_err_with(|| format!("failed to read {}", cli.file.display()))?;
    let (products, categories) = parse_seed(&json)?;
    info!(products = products.len(), categories = categories.len(), "catalogue parsed");

    let config = MongoConfig::with_database(cli.url, cli.database).with_app_name("catalog-seed");
    let client = database::mongodb::connect_with_retry(&config, None).await?;
    let repository = MongoProductRepository::new(&client.database(config.database()));

    repository.init_indexes().await?;
    let written = repository.upsert_products(&products).await?;
    info!(written, "products upserted");

    if !cli.skip_categories {
        repository.replace_categories(&categories).await?;
        info!("categories replaced");
    }

    client.shutdown().await;
    Ok(())
}
