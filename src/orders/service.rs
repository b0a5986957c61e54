//! Order Service - booking lifecycle
//!
//! Orchestrates validation, the existence gate, conflict checks and store
//! calls. Handlers stay thin HTTP adapters over this type.
//!
//! ```text
//! nonexistent ──create──▶ active ──update──▶ active ──delete──▶ deleted
//!              (cross-order)     (cross-order + displacement)   (no checks)
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::conflict::{ConflictChecker, Verdict};
use super::error::OrderError;
use super::locks::{BookingGuard, BookingLocks};
use super::models::{Order, OrderId, ServiceId};
use super::store::OrderStore;
use super::validation::{OrderRequest, validate_order_request};

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    checker: ConflictChecker,
    locks: Option<BookingLocks>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, checker: ConflictChecker) -> Self {
        Self {
            store,
            checker,
            locks: None,
        }
    }

    /// Serialize check-and-write per service id (see [`BookingLocks`])
    pub fn with_booking_locks(mut self) -> Self {
        self.locks = Some(BookingLocks::new());
        self
    }

    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Order store ping failed");
                false
            }
        }
    }

    async fn lock(&self, service_ids: &BTreeSet<ServiceId>) -> Option<BookingGuard> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(service_ids).await),
            None => None,
        }
    }

    /// Existence gate: resolve the id or fail with NotFound
    async fn load(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.clone()))
    }

    /// Create a new order
    pub async fn create(&self, req: OrderRequest) -> Result<Order, OrderError> {
        let draft = validate_order_request(req)?;
        let _guard = self.lock(&draft.service_ids()).await;

        let query = self.checker.creation_query(&draft);
        let found = self.store.find_conflicting(&query).await?;
        if let Verdict::Conflict(rule) = self.checker.cross_order(found.as_ref()) {
            warn!(
                rule = %rule,
                datetime = %draft.datetime,
                services = ?query.service_ids,
                existing = ?found.as_ref().map(|o| o.id.as_str()),
                "Create rejected"
            );
            return Err(OrderError::Conflict(rule));
        }

        let order = Order::from_draft(OrderId::generate(), draft);
        self.store.insert(&order).await?;
        info!(order_id = %order.id, datetime = %order.datetime, "Order created");
        Ok(order)
    }

    /// All orders in insertion order
    pub async fn list(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: &OrderId) -> Result<Order, OrderError> {
        self.load(id).await
    }

    /// Full-field update, re-validated against both conflict rules
    pub async fn update(&self, id: &OrderId, req: OrderRequest) -> Result<Order, OrderError> {
        let mut current = self.load(id).await?;
        let draft = validate_order_request(req)?;

        // Lock old and new services. Under the lock the record may have been
        // rebooked onto other services since the last read; widen and retry.
        let mut touched = draft.service_ids();
        let _guard = loop {
            touched.extend(current.service_ids());
            let Some(guard) = self.lock(&touched).await else {
                break None;
            };
            current = self.load(id).await?;
            if current.service_ids().is_subset(&touched) {
                break Some(guard);
            }
            drop(guard);
        };

        let query = self.checker.update_query(id, &draft);
        let found = self.store.find_conflicting(&query).await?;
        let verdict = self
            .checker
            .update_verdict(&current, &draft, found.as_ref());
        if let Verdict::Conflict(rule) = verdict {
            warn!(
                order_id = %id,
                rule = %rule,
                from = %current.datetime,
                to = %draft.datetime,
                existing = ?found.as_ref().map(|o| o.id.as_str()),
                "Update rejected"
            );
            return Err(OrderError::Conflict(rule));
        }

        let updated = Order::from_draft(id.clone(), draft);
        if !self.store.replace(&updated).await? {
            return Err(OrderError::NotFound(id.clone()));
        }
        info!(order_id = %id, datetime = %updated.datetime, "Order updated");
        Ok(updated)
    }

    /// Delete without any conflict re-check
    pub async fn delete(&self, id: &OrderId) -> Result<(), OrderError> {
        self.load(id).await?;
        if !self.store.delete(id).await? {
            return Err(OrderError::NotFound(id.clone()));
        }
        debug!(order_id = %id, "Order deleted");
        Ok(())
    }
}
