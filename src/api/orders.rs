//! Order handlers
//!
//! `POST /orders` persists the Pending order and creates the gateway order
//! in one request, so the client gets back both identifiers it needs to
//! open the payment widget.

use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json as Db;
use uuid::Uuid;
use validator::Validate;

use super::{AppState, CreateOrderRequest, ListParams, OrderCreatedResponse, PaginatedResponse, StatusUpdateRequest};
use crate::domain::aggregates::cart::CartLine;
use crate::domain::aggregates::order::{Buyer, Order, OrderStatus};
use crate::domain::events::{DomainEvent, OrderEvent};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub buyer: Db<Buyer>,
    pub lines: Db<Vec<CartLine>>,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub gateway_order_id: String,
    pub receipt: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<OrderCreatedResponse>), (StatusCode, String)> {
    r.validate().map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let currency = s.config.gateway.currency.clone();
    let mut order = Order::place(r.buyer(), r.cart_items, &currency)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let gateway_order = s.gateway
        .create_order(order.total().minor_units(), order.total().currency(), order.receipt())
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;
    order.attach_gateway_order(gateway_order.id.clone());

    sqlx::query(
        "INSERT INTO orders (id, buyer, lines, total_amount, currency, status, gateway_order_id, receipt, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
        .bind(order.id())
        .bind(Db(order.buyer()))
        .bind(Db(order.lines()))
        .bind(order.total().amount())
        .bind(order.total().currency())
        .bind(order.status().as_str())
        .bind(&gateway_order.id)
        .bind(order.receipt())
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    for event in order.take_events() {
        s.events.publish(&event).await;
    }

    tracing::info!(order_id = %order.id(), gateway_order_id = %gateway_order.id, "order placed");
    Ok((StatusCode::CREATED, Json(OrderCreatedResponse {
        order_id: order.id(),
        gateway_order_id: Some(gateway_order.id),
        gateway_amount: gateway_order.amount,
        currency: gateway_order.currency,
    })))
}

pub async fn list_orders(State(s): State<AppState>, Query(p): Query<ListParams>) -> Result<Json<PaginatedResponse<OrderRecord>>, (StatusCode, String)> {
    let page = p.page.unwrap_or(1).max(1);
    let per_page = p.per_page.unwrap_or(20).min(100);
    let orders = sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2")
        .bind(per_page as i64).bind(((page - 1) * per_page) as i64)
        .fetch_all(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
        .fetch_one(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(PaginatedResponse { data: orders, total: total.0, page }))
}

pub async fn get_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<OrderRecord>, (StatusCode, String)> {
    sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE id = $1").bind(id)
        .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map(Json).ok_or((StatusCode::NOT_FOUND, "Order not found".to_string()))
}

pub async fn orders_by_customer(State(s): State<AppState>, Path(email): Path<String>) -> Result<Json<Vec<OrderRecord>>, (StatusCode, String)> {
    let orders = sqlx::query_as::<_, OrderRecord>("SELECT * FROM orders WHERE buyer->>'email' = $1 ORDER BY created_at DESC")
        .bind(&email)
        .fetch_all(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(orders))
}

pub async fn delete_order(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, (StatusCode, String)> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1").bind(id)
        .execute(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if result.rows_affected() == 0 {
        return Err((StatusCode::NOT_FOUND, "Order not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Admin status update. Terminal states are sticky: a paid or failed order
/// never moves again, matching the aggregate's transition rules.
pub async fn update_order_status(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<StatusUpdateRequest>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    if r.status == OrderStatus::Pending {
        return Err((StatusCode::BAD_REQUEST, "Cannot reset an order to pending".to_string()));
    }
    let result = sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 AND status = 'pending'")
        .bind(id).bind(r.status.as_str())
        .execute(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    if result.rows_affected() == 0 {
        let exists: Option<(String,)> = sqlx::query_as("SELECT status FROM orders WHERE id = $1").bind(id)
            .fetch_optional(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        return match exists {
            Some(_) => Err((StatusCode::CONFLICT, "Order is in a terminal state".to_string())),
            None => Err((StatusCode::NOT_FOUND, "Order not found".to_string())),
        };
    }
    if r.status == OrderStatus::Paid {
        s.events.publish(&DomainEvent::Order(OrderEvent::Paid { order_id: id })).await;
    }
    Ok(Json(serde_json::json!({ "message": "Order status updated" })))
}
