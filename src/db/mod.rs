//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Order tables, idempotent
const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS orders_tb (
        seq BIGSERIAL PRIMARY KEY,
        order_id TEXT NOT NULL UNIQUE,
        datetime TIMESTAMPTZ NOT NULL,
        total_fee NUMERIC NOT NULL CHECK (total_fee >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_datetime ON orders_tb (datetime)",
    r#"CREATE TABLE IF NOT EXISTS order_services_tb (
        order_id TEXT NOT NULL REFERENCES orders_tb (order_id) ON DELETE CASCADE,
        position INT NOT NULL,
        service_id BIGINT NOT NULL,
        PRIMARY KEY (order_id, position)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_order_services_service ON order_services_tb (service_id, order_id)",
];

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(50)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create order tables and indexes if missing
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        for statement in MIGRATIONS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Order schema ready ({} statements)", MIGRATIONS.len());
        Ok(())
    }
}
