//! Service Orders gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ OrderService │───▶│  OrderStore  │
//! │  (YAML)  │    │  (axum)  │    │  (conflicts) │    │ (PG / memory)│
//! └──────────┘    └──────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Usage: `service_orders [--env dev] [--port 8080]`

use std::sync::Arc;

use service_orders::config::AppConfig;
use service_orders::db::Database;
use service_orders::orders::{MemoryOrderStore, OrderService, OrderStore, PgOrderStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn OrderStore>> {
    match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url).await?;
            db.migrate().await?;
            Ok(Arc::new(PgOrderStore::new(db.pool().clone())))
        }
        None => {
            tracing::warn!("postgres_url not set; orders are kept in memory and lost on exit");
            Ok(Arc::new(MemoryOrderStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = service_orders::logging::init_logging(&app_config);

    tracing::info!("Starting Service Orders in {} mode", env);

    let store = build_store(&app_config).await?;

    let booking = &app_config.booking;
    let mut service = OrderService::new(store, booking.checker());
    if booking.serialize_writes {
        service = service.with_booking_locks();
    }
    tracing::info!(
        window_hours = booking.window_hours,
        window_mode = ?booking.window_mode,
        serialize_writes = booking.serialize_writes,
        "Booking rules loaded"
    );

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    service_orders::gateway::run_server(&app_config.gateway.host, port, Arc::new(service)).await
}
