use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use dispatch_core::models::OrderRequest;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Checks the upstream validation layer cannot express through serde:
/// non-empty identifier and line items, positive dimensions.
fn validate(request: &OrderRequest) -> Result<(), AppError> {
    if request.order_id.trim().is_empty() {
        return Err(AppError::ValidationError(
            "order_id must not be empty".to_string(),
        ));
    }
    if request.order_items.is_empty() {
        return Err(AppError::ValidationError(
            "order_items must be a non-empty array".to_string(),
        ));
    }
    if !request.dimensions.is_valid() {
        return Err(AppError::ValidationError(
            "dimensions height, length, breadth and weight must be positive".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate(&request)?;

    let created = state.orchestrator.create_order(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "data": {
                "order_id": created.order.request.order_id,
                "shipment_id": created.order.shipment_id,
                "shipment_status": created.order.shipment_status,
                "created_at": created.order.created_at,
            },
            "shipment_api_response": created.shipment,
        })),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .store
        .find_order(&order_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Order not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": order,
    })))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(50);
    let offset = params.offset.unwrap_or(0);

    let orders = state.store.list_orders(limit, offset).await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}
