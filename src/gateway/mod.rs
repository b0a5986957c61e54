pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::orders::OrderService;
use state::AppState;

/// Build the complete router over a shared lifecycle service
pub fn router(orders: Arc<OrderService>) -> Router {
    let state = Arc::new(AppState::new(orders));

    let order_routes = Router::new()
        .route(
            "/orders",
            get(handlers::list_orders).post(handlers::create_order),
        )
        .route(
            "/orders/{id}",
            get(handlers::get_order)
                .patch(handlers::update_order)
                .delete(handlers::delete_order),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", order_routes)
        .fallback(handlers::route_not_found)
        .with_state(state)
        // stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
}

/// Start HTTP Gateway server; returns after Ctrl-C
pub async fn run_server(host: &str, port: u16, orders: Arc<OrderService>) -> anyhow::Result<()> {
    let app = router(orders);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
