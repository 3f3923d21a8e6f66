//! Order endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use common::OrderId;
use domain::{Order, OrderStatus};
use saga::{CancelledOrder, Capability, OrderRequestItem};
use serde::Deserialize;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderRequestItem>,
    pub shipping_address: String,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}

fn parse_status(status: Option<String>) -> Result<Option<OrderStatus>, ApiError> {
    status
        .map(|s| {
            OrderStatus::from_str(&s).map_err(|_| ApiError::BadRequest(format!("Invalid status: {s}")))
        })
        .transpose()
}

/// POST /orders — run the order creation saga.
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let order = state
        .orchestrator
        .create_order(&user, req.items, req.shipping_address)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders — all orders for admins, own orders for clients.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let status = parse_status(query.status)?;
    let orders = state
        .orchestrator
        .list_orders(&Capability::for_user(&user), status)
        .await?;
    Ok(Json(orders))
}

/// GET /orders/my-orders — the requester's own orders.
pub async fn my_orders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let status = parse_status(query.status)?;
    let orders = state
        .orchestrator
        .my_orders(&Capability::for_user(&user), status)
        .await?;
    Ok(Json(orders))
}

/// GET /orders/{id} — load one order, owner or admin only.
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let order_id = parse_order_id(&id)?;
    let order = state
        .orchestrator
        .get_order(order_id, &Capability::for_user(&user))
        .await?;
    Ok(Json(order))
}

/// PUT /orders/{id}/status — admin-only state machine transition.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let order_id = parse_order_id(&id)?;
    let next = OrderStatus::from_str(&req.status)
        .map_err(|_| ApiError::BadRequest(format!("Invalid status: {}", req.status)))?;
    let order = state
        .orchestrator
        .update_status(order_id, next, &Capability::for_user(&user))
        .await?;
    Ok(Json(order))
}

/// PUT /orders/{id}/cancel — cancel and restore stock.
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CancelledOrder>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let order_id = parse_order_id(&id)?;
    let cancelled = state
        .orchestrator
        .cancel_order(order_id, &Capability::for_user(&user))
        .await?;
    Ok(Json(cancelled))
}

/// DELETE /orders/{id} — permanently remove a cancelled order.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let order_id = parse_order_id(&id)?;
    let order = state
        .orchestrator
        .delete_order(order_id, &Capability::for_user(&user))
        .await?;
    Ok(Json(order))
}
