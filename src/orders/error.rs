//! Order lifecycle error types

use thiserror::Error;

use super::conflict::{CONFLICT_MESSAGE, ConflictRule};
use super::models::OrderId;
use super::validation::ValidationError;

/// Order store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt order record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Errors surfaced by the order lifecycle service
#[derive(Error, Debug)]
pub enum OrderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", CONFLICT_MESSAGE)]
    Conflict(ConflictRule),

    #[error("Order not found: {0}")]
    NotFound(OrderId),

    #[error("Order store failure: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            OrderError::Validation(_) => "VALIDATION_ERROR",
            OrderError::Conflict(_) => "CONFLICT",
            OrderError::NotFound(_) => "NOT_FOUND",
            OrderError::Store(_) => "INTERNAL_ERROR",
        }
    }
}
