//! Service Orders - time-stamped service booking
//!
//! Orders book one or more services at an instant. Two orders sharing a
//! service id may not sit within the 3-hour conflict window of each other,
//! and an order may not be rescheduled to within 3 hours of its own time.
//!
//! # Modules
//!
//! - [`orders`] - Order model, conflict rules, stores, lifecycle service
//! - [`gateway`] - axum HTTP layer
//! - [`db`] - PostgreSQL pool and schema
//! - [`config`] - YAML configuration
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod orders;

// Convenient re-exports at crate root
pub use orders::{
    ConflictChecker, ConflictRule, ConflictWindow, MemoryOrderStore, Order, OrderError, OrderId,
    OrderRequest, OrderService, OrderStore, PgOrderStore, ServiceId, ServiceRef, WindowMode,
};
