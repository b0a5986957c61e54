//! Order store abstraction
//!
//! The lifecycle service only talks to [`OrderStore`], so the same
//! orchestration runs against PostgreSQL in production and against
//! [`MemoryOrderStore`] in tests or when no database is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::conflict::ConflictQuery;
use super::error::StoreError;
use super::models::{Order, OrderId};

/// Durable collection of orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Full-field replace. Returns false if no order has that id.
    async fn replace(&self, order: &Order) -> Result<bool, StoreError>;

    /// Returns false if no order has that id.
    async fn delete(&self, id: &OrderId) -> Result<bool, StoreError>;

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// All orders in insertion order
    async fn list(&self) -> Result<Vec<Order>, StoreError>;

    /// First stored order (insertion order) matching the conflict predicate
    async fn find_conflicting(&self, query: &ConflictQuery) -> Result<Option<Order>, StoreError>;

    /// Liveness probe for health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-process store, insertion ordered
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn replace(&self, order: &Order) -> Result<bool, StoreError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(slot) => {
                *slot = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, StoreError> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| &o.id != id);
        Ok(orders.len() != before)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| &o.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.clone())
    }

    async fn find_conflicting(&self, query: &ConflictQuery) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|o| query.matches(o))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::ServiceRef;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    fn order(id: &str, hour: u32, service: i64) -> Order {
        Order {
            id: OrderId::from(id),
            datetime: Utc.with_ymd_and_hms(2023, 7, 8, hour, 0, 0).unwrap(),
            total_fee: Decimal::new(10, 0),
            services: vec![ServiceRef::new(service)],
        }
    }

    #[tokio::test]
    async fn test_insert_get_list_keep_insertion_order() {
        let store = MemoryOrderStore::new();
        store.insert(&order("b", 10, 1)).await.unwrap();
        store.insert(&order("a", 9, 2)).await.unwrap();

        let ids: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id.to_string())
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(
            store.get(&OrderId::from("a")).await.unwrap(),
            Some(order("a", 9, 2))
        );
        assert_eq!(store.get(&OrderId::from("zz")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_replace_and_delete_report_missing() {
        let store = MemoryOrderStore::new();
        assert!(!store.replace(&order("a", 9, 1)).await.unwrap());
        assert!(!store.delete(&OrderId::from("a")).await.unwrap());

        store.insert(&order("a", 9, 1)).await.unwrap();
        assert!(store.replace(&order("a", 15, 3)).await.unwrap());
        assert_eq!(
            store.get(&OrderId::from("a")).await.unwrap(),
            Some(order("a", 15, 3))
        );

        assert!(store.delete(&OrderId::from("a")).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_conflicting_uses_query_predicate() {
        let store = MemoryOrderStore::new();
        store.insert(&order("a", 9, 1)).await.unwrap();
        store.insert(&order("b", 11, 2)).await.unwrap();

        let query = ConflictQuery {
            not_before: Utc.with_ymd_and_hms(2023, 7, 8, 10, 0, 0).unwrap(),
            not_after: None,
            service_ids: vec![1, 2],
            exclude: None,
        };
        let found = store.find_conflicting(&query).await.unwrap();
        assert_eq!(found.map(|o| o.id), Some(OrderId::from("b")));

        let excluded = ConflictQuery {
            exclude: Some(OrderId::from("b")),
            ..query
        };
        assert_eq!(store.find_conflicting(&excluded).await.unwrap(), None);
    }
}
