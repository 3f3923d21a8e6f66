//! Inventory (stock ledger) endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use domain::ProductId;
use ledger::{AdjustOperation, StockCheck, StockFilter, StockLedger, StockRecord, StockStatus};
use saga::Capability;
use serde::Deserialize;

use crate::AppState;
use crate::auth::authenticate;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ProvisionRequest {
    pub product_id: String,
    pub quantity: u32,
    pub min_stock: Option<u32>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize)]
pub struct CheckQuery {
    pub quantity: u32,
}

/// Wire encoding kept from the original service: 1 adds, 2 subtracts.
#[derive(Deserialize)]
pub struct AdjustRequest {
    pub quantity: u32,
    pub operation: u8,
}

#[derive(Deserialize)]
pub struct DiscountRequest {
    pub quantity: u32,
}

/// POST /inventory — provision a stock record for a catalog product.
pub async fn provision(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<ProvisionRequest>,
) -> Result<(StatusCode, Json<StockRecord>), ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let record = state
        .orchestrator
        .provision_stock(
            &Capability::for_user(&user),
            ProductId::from(req.product_id),
            req.quantity,
            req.min_stock,
            req.location,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /inventory — list stock records, optionally filtered.
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StockRecord>>, ApiError> {
    authenticate(&state.identity, &headers).await?;
    let status = query
        .status
        .map(|s| {
            StockStatus::from_str(&s)
                .map_err(|_| ApiError::BadRequest(format!("Invalid status: {s}")))
        })
        .transpose()?;
    let records = state
        .ledger
        .list(StockFilter {
            status,
            location: query.location,
        })
        .await;
    Ok(Json(records))
}

/// GET /inventory/low-stock — records at or below their threshold.
pub async fn low_stock(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<StockRecord>>, ApiError> {
    authenticate(&state.identity, &headers).await?;
    Ok(Json(state.ledger.low_stock().await))
}

/// GET /inventory/{product_id} — one stock record.
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Json<StockRecord>, ApiError> {
    authenticate(&state.identity, &headers).await?;
    let record = state
        .ledger
        .get(&ProductId::from(product_id.clone()))
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No stock record for product {product_id}")))?;
    Ok(Json(record))
}

/// GET /inventory/{product_id}/check?quantity= — read-only availability.
pub async fn check(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<StockCheck>, ApiError> {
    authenticate(&state.identity, &headers).await?;
    let result = state
        .ledger
        .check(&ProductId::from(product_id), query.quantity)
        .await?;
    Ok(Json(result))
}

/// PUT /inventory/{product_id} — manual stock correction.
pub async fn adjust(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<StockRecord>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let operation = match req.operation {
        1 => AdjustOperation::Add,
        2 => AdjustOperation::Subtract,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Invalid operation {other}: use 1 (add) or 2 (subtract)"
            )));
        }
    };
    let record = state
        .orchestrator
        .adjust_stock(
            &Capability::for_user(&user),
            ProductId::from(product_id),
            req.quantity,
            operation,
        )
        .await?;
    Ok(Json(record))
}

/// POST /inventory/{product_id}/discount — atomic reserve-if-available.
pub async fn discount(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(req): Json<DiscountRequest>,
) -> Result<Json<StockRecord>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let capability = Capability::for_user(&user);
    if !capability.is_admin() {
        return Err(ApiError::Saga(saga::SagaError::Forbidden(
            "only admins can manage stock",
        )));
    }
    let record = state
        .ledger
        .reserve(&ProductId::from(product_id), req.quantity)
        .await?;
    Ok(Json(record))
}

/// DELETE /inventory/{product_id} — remove a stock record.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<Json<StockRecord>, ApiError> {
    let user = authenticate(&state.identity, &headers).await?;
    let record = state
        .orchestrator
        .delete_stock(&Capability::for_user(&user), ProductId::from(product_id))
        .await?;
    Ok(Json(record))
}
