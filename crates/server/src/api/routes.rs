use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, orders};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Order runs
        .route("/orders/run", post(orders::run_orders))
        .route("/orders/status", get(orders::get_status));

    Router::new()
        .nest("/api/v1", api_routes)
        // Legacy webhook path used by the sheet-side trigger script
        .route("/start-orders", post(orders::run_orders))
        .route("/metrics", get(serve_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_metrics() -> String {
    crate::metrics::encode_metrics()
}
