use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Malformed request: page/pageSize out of range, bad cursor token, blank id
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    /// Document store or transport failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ProductError::InvalidArgument(msg.into())
    }

    pub fn product_not_found() -> Self {
        ProductError::NotFound("Product not found".to_string())
    }

    pub fn categories_not_found() -> Self {
        ProductError::NotFound("No categories found".to_string())
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            ProductError::NotFound(msg) => AppError::NotFound(msg),
            ProductError::StoreUnavailable(detail) => AppError::StoreUnavailable(detail),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::StoreUnavailable(err.to_string())
    }
}
