//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ProductResult;
use crate::models::{Product, ProductData};
use crate::query::{
    Cursor, FieldFilter, FilterField, OrderKey, SortDirection, SortField, SortValue, StoreQuery,
};
use crate::repository::ProductRepository;

pub const PRODUCTS_COLLECTION: &str = "products";
pub const CATEGORIES_COLLECTION: &str = "categories";
/// Id of the single document holding the category list
pub const ALL_CATEGORIES_ID: &str = "allCategories";

/// Stored shape: the product id is the document `_id`, every other field
/// sits at the top level.
#[derive(Debug, Serialize, Deserialize)]
struct ProductRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(flatten)]
    data: ProductData,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(record.id, record.data)
    }
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            data: product.data.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoriesRecord {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    categories: Vec<String>,
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    products: Collection<ProductRecord>,
    categories: Collection<CategoriesRecord>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collections(db, PRODUCTS_COLLECTION, CATEGORIES_COLLECTION)
    }

    /// Use custom collection names
    pub fn with_collections(db: &Database, products: &str, categories: &str) -> Self {
        Self {
            products: db.collection(products),
            categories: db.collection(categories),
        }
    }

    /// Create the indexes backing every supported listing order
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            // Category listing sorted by price
            IndexModel::builder()
                .keys(doc! { "category": 1, "price": 1, "_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_price".to_string())
                        .build(),
                )
                .build(),
            // Category listing in default order
            IndexModel::builder()
                .keys(doc! { "category": 1, "_id": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_id".to_string())
                        .build(),
                )
                .build(),
            // Unfiltered listing sorted by price
            IndexModel::builder()
                .keys(doc! { "price": 1, "_id": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
        ];

        self.products.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Insert or replace products by id. Returns how many were written.
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn upsert_products(&self, products: &[Product]) -> ProductResult<u64> {
        let mut written = 0;
        for product in products {
            let result = self
                .products
                .replace_one(doc! { "_id": product.id.as_str() }, ProductRecord::from(product))
                .with_options(ReplaceOptions::builder().upsert(true).build())
                .await?;
            written += result.modified_count + u64::from(result.upserted_id.is_some());
        }
        Ok(written)
    }

    /// Replace the stored category list
    #[instrument(skip(self, categories), fields(count = categories.len()))]
    pub async fn replace_categories(&self, categories: &[String]) -> ProductResult<()> {
        let record = CategoriesRecord {
            id: ALL_CATEGORIES_ID.to_string(),
            categories: categories.to_vec(),
        };
        self.categories
            .replace_one(doc! { "_id": ALL_CATEGORIES_ID }, record)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await?;
        Ok(())
    }

    fn field_name(field: SortField) -> &'static str {
        match field {
            SortField::Price => "price",
            SortField::Id => "_id",
        }
    }

    fn to_bson(value: SortValue<'_>) -> Bson {
        match value {
            SortValue::Price(price) => Bson::Double(price),
            SortValue::Id(id) => Bson::String(id.to_string()),
        }
    }

    /// Equality filters plus, with a cursor, the "strictly after" range:
    /// `k1 > v1 OR (k1 = v1 AND k2 > v2) ...`, with `<` for descending keys.
    fn build_filter(
        filters: &[FieldFilter],
        order: &[OrderKey],
        start_after: Option<&Cursor>,
    ) -> ProductResult<Document> {
        let mut filter = doc! {};

        for f in filters {
            match f.field {
                FilterField::Category => filter.insert("category", f.value.as_str()),
            };
        }

        if let Some(cursor) = start_after {
            let mut branches = Vec::with_capacity(order.len());
            for (i, key) in order.iter().enumerate() {
                let mut branch = Document::new();
                for prev in &order[..i] {
                    branch.insert(
                        Self::field_name(prev.field),
                        Self::to_bson(cursor.value(prev.field)?),
                    );
                }
                let op = match key.direction {
                    SortDirection::Ascending => "$gt",
                    SortDirection::Descending => "$lt",
                };
                let mut bound = Document::new();
                bound.insert(op, Self::to_bson(cursor.value(key.field)?));
                branch.insert(Self::field_name(key.field), bound);
                branches.push(Bson::Document(branch));
            }
            filter.insert("$or", branches);
        }

        Ok(filter)
    }

    /// Price-ordered listing as an aggregation. A missing `price` is read as
    /// `0.0` before the range and sort, the same value the product
    /// deserializes to.
    fn build_price_pipeline(query: &StoreQuery, limit: i64) -> ProductResult<Vec<Document>> {
        let matched = Self::build_filter(&query.filters, &[], None)?;
        let mut pipeline = vec![
            doc! { "$match": matched },
            doc! { "$addFields": { "price": { "$ifNull": ["$price", 0.0] } } },
        ];
        if let Some(cursor) = query.start_after.as_ref() {
            let range = Self::build_filter(&[], &query.order, Some(cursor))?;
            pipeline.push(doc! { "$match": range });
        }
        let sort = Self::build_sort(&query.order);
        pipeline.push(doc! { "$sort": sort });
        pipeline.push(doc! { "$limit": limit });
        Ok(pipeline)
    }

    fn build_sort(order: &[OrderKey]) -> Document {
        let mut sort = doc! {};
        for key in order {
            let direction = match key.direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            sort.insert(Self::field_name(key.field), direction);
        }
        sort
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn find(&self, query: &StoreQuery) -> ProductResult<Vec<Product>> {
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let records: Vec<ProductRecord> = if query.order.iter().any(|k| k.field == SortField::Price)
        {
            let pipeline = Self::build_price_pipeline(query, limit)?;
            let cursor = self.products.aggregate(pipeline).await?;
            cursor.with_type::<ProductRecord>().try_collect().await?
        } else {
            let filter =
                Self::build_filter(&query.filters, &query.order, query.start_after.as_ref())?;
            let options = FindOptions::builder()
                .sort(Self::build_sort(&query.order))
                .limit(limit)
                .build();
            let cursor = self.products.find(filter).with_options(options).await?;
            cursor.try_collect().await?
        };

        Ok(records.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, filters: &[FieldFilter]) -> ProductResult<u64> {
        let filter = Self::build_filter(filters, &[], None)?;
        let count = self.products.count_documents(filter).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> ProductResult<Option<Product>> {
        let record = self.products.find_one(doc! { "_id": id }).await?;
        Ok(record.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> ProductResult<Option<Vec<String>>> {
        let record = self
            .categories
            .find_one(doc! { "_id": ALL_CATEGORIES_ID })
            .await?;
        Ok(record.map(|r| r.categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortKey;

    #[test]
    fn test_build_filter_empty() {
        let filter = MongoProductRepository::build_filter(&[], &[], None).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_build_filter_with_category() {
        let filter =
            MongoProductRepository::build_filter(&[FieldFilter::category("beauty")], &[], None)
                .unwrap();
        assert_eq!(filter, doc! { "category": "beauty" });
    }

    #[test]
    fn test_build_filter_after_price_cursor() {
        let cursor = Cursor {
            price: Some(9.99),
            id: "007".into(),
        };
        let filter = MongoProductRepository::build_filter(
            &[FieldFilter::category("beauty")],
            &SortKey::PriceAscending.order_keys(),
            Some(&cursor),
        )
        .unwrap();

        assert_eq!(
            filter,
            doc! {
                "category": "beauty",
                "$or": [
                    { "price": { "$gt": 9.99 } },
                    { "price": 9.99, "_id": { "$gt": "007" } }
                ]
            }
        );
    }

    #[test]
    fn test_build_filter_after_id_cursor_descending() {
        let cursor = Cursor {
            price: None,
            id: "045".into(),
        };
        let filter = MongoProductRepository::build_filter(
            &[],
            &SortKey::Default.order_keys(),
            Some(&cursor),
        )
        .unwrap();

        assert_eq!(filter, doc! { "$or": [ { "_id": { "$lt": "045" } } ] });
    }

    #[test]
    fn test_build_filter_rejects_cursor_without_price() {
        let cursor = Cursor {
            price: None,
            id: "007".into(),
        };
        assert!(MongoProductRepository::build_filter(
            &[],
            &SortKey::PriceDescending.order_keys(),
            Some(&cursor)
        )
        .is_err());
    }

    #[test]
    fn test_price_pipeline_defaults_missing_price_before_range() {
        let query = StoreQuery {
            filters: vec![FieldFilter::category("beauty")],
            order: SortKey::PriceAscending.order_keys(),
            limit: 2,
            start_after: Some(Cursor {
                price: Some(0.0),
                id: "002".into(),
            }),
        };
        let pipeline = MongoProductRepository::build_price_pipeline(&query, 2).unwrap();

        assert_eq!(
            pipeline,
            vec![
                doc! { "$match": { "category": "beauty" } },
                doc! { "$addFields": { "price": { "$ifNull": ["$price", 0.0] } } },
                doc! { "$match": { "$or": [
                    { "price": { "$gt": 0.0 } },
                    { "price": 0.0, "_id": { "$gt": "002" } }
                ] } },
                doc! { "$sort": { "price": 1, "_id": 1 } },
                doc! { "$limit": 2_i64 },
            ]
        );
    }

    #[test]
    fn test_build_sort() {
        assert_eq!(
            MongoProductRepository::build_sort(&SortKey::PriceDescending.order_keys()),
            doc! { "price": -1, "_id": -1 }
        );
        assert_eq!(
            MongoProductRepository::build_sort(&SortKey::Default.order_keys()),
            doc! { "_id": -1 }
        );
    }

    #[test]
    fn test_record_flattens_data() {
        let record = ProductRecord::from(&Product::new(
            "001",
            ProductData {
                title: "Essence Mascara Lash Princess".into(),
                price: 9.99,
                ..Default::default()
            },
        ));
        let document = mongodb::bson::to_document(&record).unwrap();

        assert_eq!(document.get_str("_id").unwrap(), "001");
        assert_eq!(document.get_f64("price").unwrap(), 9.99);
        assert!(!document.contains_key("data"));
    }
}
