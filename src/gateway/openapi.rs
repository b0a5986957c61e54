//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{ErrorResponse, MessageResponse};
use crate::orders::{Order, OrderRequest, ServiceRef};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Service Orders API",
        version = "1.0.0",
        description = "Book time-stamped service orders. Orders sharing a service id must respect a 3-hour separation window.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::order::create_order,
        crate::gateway::handlers::order::list_orders,
        crate::gateway::handlers::order::get_order,
        crate::gateway::handlers::order::update_order,
        crate::gateway::handlers::order::delete_order,
    ),
    components(
        schemas(
            HealthResponse,
            Order,
            OrderRequest,
            ServiceRef,
            ErrorResponse,
            MessageResponse,
        )
    ),
    tags(
        (name = "System", description = "Health and diagnostics"),
        (name = "Orders", description = "Service order booking")
    )
)]
pub struct ApiDoc;
