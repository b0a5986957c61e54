//! Service order booking
//!
//! - [`models`] - Order, OrderId, ServiceRef
//! - [`validation`] - Request body checks
//! - [`conflict`] - 3-hour same-service conflict rules (pure)
//! - [`store`] - OrderStore trait + in-memory store
//! - [`pg_store`] - PostgreSQL store
//! - [`locks`] - Optional per-service booking locks
//! - [`service`] - Lifecycle orchestration

pub mod conflict;
pub mod error;
pub mod locks;
pub mod models;
pub mod pg_store;
pub mod service;
pub mod store;
pub mod validation;

pub use conflict::{
    CONFLICT_MESSAGE, ConflictChecker, ConflictQuery, ConflictRule, ConflictWindow, Verdict,
    WindowMode,
};
pub use error::{OrderError, StoreError};
pub use models::{Order, OrderDraft, OrderId, ServiceId, ServiceRef};
pub use pg_store::PgOrderStore;
pub use service::OrderService;
pub use store::{MemoryOrderStore, OrderStore};
pub use validation::{OrderRequest, RequestDatetime, ValidationError, validate_order_request};
