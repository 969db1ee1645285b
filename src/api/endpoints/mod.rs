//! API endpoint handlers.

pub mod health;
pub mod patients;

use crate::api::error::ApiError;

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".into())
}
