//! HTTP JSON API for the dashboard views

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;
pub use service::DashboardService;

pub fn create_rest_router(service: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Views
        .route("/api/v1/views", get(handlers::list_views))
        .route("/api/v1/views/:view", get(handlers::get_view))
        .route("/api/v1/charts/:view", get(handlers::get_charts))
        .route("/api/v1/insights", get(handlers::get_insights))
        // Breakdowns
        .route("/api/v1/groups/:key", get(handlers::get_groups))
        .route("/api/v1/suppliers", get(handlers::get_suppliers))
        .route("/api/v1/partners", get(handlers::get_partners))
        .route("/api/v1/products", get(handlers::get_products))
        // State and middleware
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
