//! Extractors that reject with [`AppError`](crate::AppError) bodies.

pub mod validated_query;

pub use validated_query::ValidatedQuery;
