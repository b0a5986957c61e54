use std::sync::Arc;
use std::time::Instant;

use crate::orders::OrderService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Booking lifecycle; owns the store handle built at startup
    pub orders: Arc<OrderService>,
    started_at: Instant,
}

impl AppState {
    pub fn new(orders: Arc<OrderService>) -> Self {
        Self {
            orders,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
