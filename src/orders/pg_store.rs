//! PostgreSQL order store
//!
//! Orders live in `orders_tb`; their services in `order_services_tb`, one row
//! per position. Multi-statement writes run inside a transaction so an order
//! is never visible without its services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::conflict::ConflictQuery;
use super::error::StoreError;
use super::models::{Order, OrderId, ServiceId, ServiceRef};
use super::store::OrderStore;

/// Shared SELECT: one row per order with its services aggregated in position order
const SELECT_ORDERS: &str = r#"
    SELECT o.order_id, o.datetime, o.total_fee,
           COALESCE(
               array_agg(s.service_id ORDER BY s.position) FILTER (WHERE s.service_id IS NOT NULL),
               '{}'
           ) AS service_ids
    FROM orders_tb o
    LEFT JOIN order_services_tb s ON s.order_id = o.order_id
"#;

const GROUP_ORDERS: &str = "GROUP BY o.seq, o.order_id, o.datetime, o.total_fee";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: &PgRow) -> Result<Order, StoreError> {
        let id: String = row.try_get("order_id")?;
        let datetime: DateTime<Utc> = row.try_get("datetime")?;
        let total_fee: Decimal = row.try_get("total_fee")?;
        let service_ids: Vec<ServiceId> = row.try_get("service_ids")?;

        if service_ids.is_empty() {
            return Err(StoreError::Corrupt {
                id,
                reason: "order has no services".to_string(),
            });
        }

        Ok(Order {
            id: OrderId::from(id),
            datetime,
            total_fee,
            services: service_ids.into_iter().map(ServiceRef::new).collect(),
        })
    }

    async fn write_services(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        let service_ids: Vec<ServiceId> = order.services.iter().map(|s| s.service_id).collect();
        sqlx::query(
            r#"
            INSERT INTO order_services_tb (order_id, position, service_id)
            SELECT $1, t.ord::INT, t.sid
            FROM UNNEST($2::BIGINT[]) WITH ORDINALITY AS t(sid, ord)
            "#,
        )
        .bind(order.id.as_str())
        .bind(&service_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders_tb (order_id, datetime, total_fee, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.datetime)
        .bind(order.total_fee)
        .execute(&mut *tx)
        .await?;

        Self::write_services(&mut tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn replace(&self, order: &Order) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders_tb
            SET datetime = $2, total_fee = $3, updated_at = NOW()
            WHERE order_id = $1
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.datetime)
        .bind(order.total_fee)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM order_services_tb WHERE order_id = $1")
            .bind(order.id.as_str())
            .execute(&mut *tx)
            .await?;
        Self::write_services(&mut tx, order).await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, StoreError> {
        // order_services_tb rows go with ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM orders_tb WHERE order_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        let sql = format!("{SELECT_ORDERS} WHERE o.order_id = $1 {GROUP_ORDERS}");
        let row = sqlx::query(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let sql = format!("{SELECT_ORDERS} {GROUP_ORDERS} ORDER BY o.seq");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter().map(Self::row_to_order).collect()
    }

    async fn find_conflicting(&self, query: &ConflictQuery) -> Result<Option<Order>, StoreError> {
        let sql = format!(
            r#"{SELECT_ORDERS}
            WHERE o.datetime >= $1
              AND ($2::TIMESTAMPTZ IS NULL OR o.datetime <= $2)
              AND ($3::TEXT IS NULL OR o.order_id <> $3)
              AND EXISTS (
                  SELECT 1 FROM order_services_tb m
                  WHERE m.order_id = o.order_id AND m.service_id = ANY($4)
              )
            {GROUP_ORDERS}
            ORDER BY o.seq
            LIMIT 1"#
        );
        let row = sqlx::query(&sql)
            .bind(query.not_before)
            .bind(query.not_after)
            .bind(query.exclude.as_ref().map(OrderId::as_str))
            .bind(&query.service_ids)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_order).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
