//! Order handlers (create, list, get, update, delete)

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::orders::{Order, OrderId, OrderRequest};

use super::super::state::AppState;
use super::super::types::{ApiResult, ErrorResponse, MessageResponse};

/// Create order
///
/// POST /v1/orders
#[utoipa::path(
    post,
    path = "/v1/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 400, description = "Missing services, invalid field, or an order already exists within 3 hours", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let Json(req) = payload?;
    let order = state.orders.create(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// List orders
///
/// GET /v1/orders
#[utoipa::path(
    get,
    path = "/v1/orders",
    responses(
        (status = 200, description = "All orders in insertion order", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list().await?))
}

/// Get order by id
///
/// GET /v1/orders/{id}
#[utoipa::path(
    get,
    path = "/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = state.orders.get(&OrderId::from(id)).await?;
    Ok(Json(order))
}

/// Replace an order's datetime, fee and services
///
/// PATCH /v1/orders/{id}
#[utoipa::path(
    patch,
    path = "/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 400, description = "Invalid body or conflict (other order, or moved within 3 hours of its own time)", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let id = OrderId::from(id);
    // existence gate precedes body checks, so a bad body on a missing id is 404
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            state.orders.get(&id).await?;
            return Err(rejection.into());
        }
    };
    let order = state.orders.update(&id, req).await?;
    Ok(Json(order))
}

/// Delete order
///
/// DELETE /v1/orders/{id}
#[utoipa::path(
    delete,
    path = "/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.orders.delete(&OrderId::from(id)).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}
