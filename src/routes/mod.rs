pub mod analyze;
pub mod documents;
pub mod health;

use crate::errors::ApiError;

/// Fallback for unknown paths
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
