//! Admin dashboard statistics

use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;

use super::{AppState, DashboardStats};

pub async fn dashboard_stats(State(s): State<AppState>) -> Result<Json<DashboardStats>, (StatusCode, String)> {
    let products: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let orders: (i64, Decimal) = sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_amount), 0) FROM orders")
        .fetch_one(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let pending: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
        .fetch_one(&s.db).await.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(DashboardStats {
        total_products: products.0,
        total_orders: orders.0,
        total_revenue: orders.1,
        pending_orders: pending.0,
    }))
}
