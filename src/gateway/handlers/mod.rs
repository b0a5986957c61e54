//! Gateway handlers
//!
//! Thin HTTP adapters over [`crate::orders::OrderService`].

pub mod health;
pub mod order;

use axum::extract::OriginalUri;

use super::types::ApiError;

pub use health::{HealthResponse, health_check};
pub use order::{create_order, delete_order, get_order, list_orders, update_order};

/// Fallback for unmatched routes
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(format!("cannot find {} in the server", uri))
}
