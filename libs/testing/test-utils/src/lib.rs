//! Shared test utilities for the catalog crates
//!
//! - `TestMongo`: MongoDB container with automatic cleanup (feature: "mongo")
//! - `TestDataBuilder`: deterministic catalogue data
//! - `assertions`: assertion helpers
//!
//! ```rust,ignore
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! #[ignore] // Requires Docker
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new("my_mongo_test").await;
//!     let builder = TestDataBuilder::from_test_name("my_mongo_test");
//!
//!     let id = builder.product_id(7); // "007"
//!     let category = builder.category(7);
//! }
//! ```

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Category names used by generated catalogues.
pub const CATEGORIES: [&str; 4] = ["beauty", "fragrances", "furniture", "groceries"];

/// Deterministic catalogue data keyed by a seed and an item index.
///
/// Prices repeat every few items so price-sorted listings exercise the id
/// tie-break.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let a = TestDataBuilder::from_test_name("pages");
    /// let b = TestDataBuilder::from_test_name("pages");
    /// assert_eq!(a.price(3), b.price(3));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Zero-padded document id, as the catalogue import writes them.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// assert_eq!(TestDataBuilder::new(1).product_id(7), "007");
    /// ```
    pub fn product_id(&self, n: usize) -> String {
        format!("{n:03}")
    }

    pub fn title(&self, n: usize) -> String {
        format!("Item {n} ({})", self.seed % 1000)
    }

    /// Price in the range 1.00..=7.99 that repeats every 7 items.
    pub fn price(&self, n: usize) -> f64 {
        let step = ((self.seed as usize).wrapping_add(n)) % 7;
        (step as f64 + 1.0) + 0.99 * ((step % 2) as f64)
    }

    pub fn category(&self, n: usize) -> &'static str {
        CATEGORIES[n % CATEGORIES.len()]
    }

    /// Unique name for a resource in this test.
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    use std::fmt::Debug;

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that `items` is ordered by `key` (non-decreasing).
    pub fn assert_sorted_by_key<T, K, F>(items: &[T], key: F, context: &str)
    where
        K: PartialOrd + Debug,
        F: Fn(&T) -> K,
    {
        for (i, pair) in items.windows(2).enumerate() {
            let (a, b) = (key(&pair[0]), key(&pair[1]));
            assert!(a <= b, "{context}: item {i} ({a:?}) sorts after item {} ({b:?})", i + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let a = TestDataBuilder::new(42);
        let b = TestDataBuilder::new(42);

        assert_eq!(a.title(3), b.title(3));
        assert_eq!(a.price(3), b.price(3));
        assert_eq!(a.name("catalog", "x"), b.name("catalog", "x"));
    }

    #[test]
    fn test_prices_repeat_for_tie_breaks() {
        let builder = TestDataBuilder::new(0);
        assert_eq!(builder.price(1), builder.price(8));
        assert!((1.0..=7.99).contains(&builder.price(5)));
    }

    #[test]
    fn test_product_id_padding() {
        let builder = TestDataBuilder::new(0);
        assert_eq!(builder.product_id(1), "001");
        assert_eq!(builder.product_id(45), "045");
        assert_eq!(builder.product_id(1234), "1234");
    }

    #[test]
    fn test_categories_cycle() {
        let builder = TestDataBuilder::new(0);
        assert_eq!(builder.category(0), builder.category(CATEGORIES.len()));
    }

    #[test]
    fn test_assert_sorted_by_key() {
        assertions::assert_sorted_by_key(&[1, 2, 2, 5], |v| *v, "ints");
    }

    #[test]
    #[should_panic(expected = "ints")]
    fn test_assert_sorted_by_key_panics() {
        assertions::assert_sorted_by_key(&[3, 1], |v| *v, "ints");
    }
}
