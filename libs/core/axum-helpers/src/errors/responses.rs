//! Reusable OpenAPI responses, referenced from `#[utoipa::path]` as
//! `(status = 400, response = BadRequestResponse)`.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request - malformed or out-of-range argument",
    content_type = "application/json",
    example = json!({
        "code": 1003,
        "error": "INVALID_ARGUMENT",
        "message": "pageSize must be between 1 and 100"
    })
)]
pub struct BadRequestResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Resource not found",
    content_type = "application/json",
    example = json!({
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "Product not found"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "code": 2001,
        "error": "STORE_UNAVAILABLE",
        "message": "Failed to read the catalogue"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Service Unavailable",
    content_type = "application/json",
    example = json!({
        "status": "not ready",
        "mongodb": "disconnected"
    })
)]
pub struct ServiceUnavailableResponse(pub ErrorResponse);
