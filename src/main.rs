//! Print Studio - storefront and admin backend

use std::sync::Arc;

use anyhow::Result;
use axum::{routing::{get, patch, post}, Json, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use print_studio::api::{categories, dashboard, orders, payments, products, AppState};
use print_studio::config::AppConfig;
use print_studio::events::EventPublisher;
use print_studio::gateway::{PaymentGateway, RazorpayGateway};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let db = PgPoolOptions::new().max_connections(10).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    let events = EventPublisher::connect(config.nats_url.as_deref()).await;
    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayGateway::new(&config.gateway));
    let port = config.port;
    let state = AppState { db, gateway, events, config: Arc::new(config) };

    let app = Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "print-studio"})) }))
        .route("/products", get(products::list_products).post(products::create_product))
        .route("/products/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/categories", get(categories::list_categories).post(categories::create_category))
        .route("/categories/:slug", get(categories::get_category).put(categories::update_category).delete(categories::delete_category))
        .route("/categories/:slug/products", get(categories::products_by_category))
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id", get(orders::get_order).delete(orders::delete_order))
        .route("/orders/:id/status", patch(orders::update_order_status))
        .route("/orders/customer/:email", get(orders::orders_by_customer))
        .route("/verify-payment", post(payments::verify_payment))
        .route("/dashboard/stats", get(dashboard::dashboard_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("🚀 Print Studio listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
