// HTTP handlers for order endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::access::{authorize, require_principal, Operation, Resource};
use crate::auth::MaybePrincipal;
use crate::error::ApiError;
use crate::orders::models::{CreateOrderRequest, OrderDto};
use crate::AppState;

/// Handler for GET /orders/{id}
/// Owner or ADMIN only
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = OrderDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Order belongs to another client", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    Path(id): Path<i32>,
) -> Result<Json<OrderDto>, ApiError> {
    authorize(principal.as_ref(), Operation::Read, Resource::Orders).into_result()?;
    let principal = require_principal(principal)?;

    // Ownership is checked once the order is loaded
    let order = state.order_service.find_by_id(id, &principal).await?;
    Ok(Json(order))
}

/// Handler for POST /orders
/// Places an order for the authenticated caller
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderDto),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown product", body = ErrorResponse),
        (status = 422, description = "Invalid order data", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn insert_order_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDto>), ApiError> {
    authorize(principal.as_ref(), Operation::Create, Resource::Orders).into_result()?;
    let principal = require_principal(principal)?;
    let Json(request) = payload?;

    let order = state.order_service.insert(request, &principal).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
