//! REST API handlers for the supply-chain dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use super::service::DashboardService;
use crate::charts::ChartSpec;
use crate::error::LoadError;
use crate::inventory::ProductSummary;
use crate::metrics::{round_to, GroupSummary, PartnerPerformance, SupplierPerformance};
use crate::models::GroupKey;
use crate::views::{AiInsightsView, View, ViewPayload};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct ViewInfo {
    pub view: View,
    pub label: &'static str,
}

#[derive(Serialize)]
pub struct ChartsResponse {
    pub view: View,
    pub charts: Vec<ChartSpec>,
}

#[derive(Serialize)]
pub struct GroupsResponse {
    pub key: GroupKey,
    pub groups: Vec<GroupSummary>,
}

#[derive(Serialize)]
pub struct ProductsResponse {
    pub products: Vec<ProductSummary>,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct QuestionQuery {
    pub question: Option<String>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Errors
// ============================================================================

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Missing file → 404, schema problems → 422, anything else → 500
fn load_error(e: LoadError) -> ApiError {
    let status = if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else if e.is_validation() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if status.is_server_error() {
        error!("Failed to load dataset: {}", e);
    } else {
        warn!("Dataset rejected: {}", e);
    }
    api_error(status, e.to_string())
}

fn parse_view(name: &str) -> Result<View, ApiError> {
    name.parse::<View>()
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e))
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "data_path": service.data_path().display().to_string(),
        "as_of": service.as_of().to_string(),
    }))
}

/// GET /api/v1/views
pub async fn list_views() -> Json<Vec<ViewInfo>> {
    Json(
        View::ALL
            .iter()
            .map(|v| ViewInfo {
                view: *v,
                label: v.label(),
            })
            .collect(),
    )
}

/// GET /api/v1/views/:view
pub async fn get_view(
    State(service): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<QuestionQuery>,
) -> Result<Json<ViewPayload>, ApiError> {
    let view = parse_view(&name)?;
    service
        .view(view, params.question.as_deref())
        .await
        .map(Json)
        .map_err(load_error)
}

/// GET /api/v1/charts/:view
pub async fn get_charts(
    State(service): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChartsResponse>, ApiError> {
    let view = parse_view(&name)?;
    let aggregates = service.aggregates().await.map_err(load_error)?;
    let charts = ViewPayload::assemble(view, &aggregates)
        .map(|payload| payload.charts().to_vec())
        .unwrap_or_default();
    Ok(Json(ChartsResponse { view, charts }))
}

/// GET /api/v1/insights?question=...
pub async fn get_insights(
    State(service): State<AppState>,
    Query(params): Query<QuestionQuery>,
) -> Result<Json<AiInsightsView>, ApiError> {
    match service.insights(params.question.as_deref()).await {
        Ok(view) => Ok(Json(view)),
        Err(e) => Err(load_error(e)),
    }
}

/// GET /api/v1/groups/:key
pub async fn get_groups(
    State(service): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<GroupsResponse>, ApiError> {
    let key: GroupKey = name
        .parse()
        .map_err(|e: String| api_error(StatusCode::NOT_FOUND, e))?;
    match service.group_summaries(key).await {
        Ok(groups) => Ok(Json(GroupsResponse {
            key,
            groups: groups
                .into_iter()
                .map(|mut g| {
                    g.delivery_rate = round_to(g.delivery_rate, 1);
                    g.delay_rate = round_to(g.delay_rate, 1);
                    g.cost_share = round_to(g.cost_share, 2);
                    g
                })
                .collect(),
        })),
        Err(e) => Err(load_error(e)),
    }
}

/// GET /api/v1/suppliers
pub async fn get_suppliers(
    State(service): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<SupplierPerformance>>, ApiError> {
    let limit = params.limit.unwrap_or(usize::MAX);
    match service.suppliers().await {
        Ok(suppliers) => Ok(Json(suppliers.into_iter().take(limit).collect())),
        Err(e) => Err(load_error(e)),
    }
}

/// GET /api/v1/partners
pub async fn get_partners(
    State(service): State<AppState>,
) -> Result<Json<Vec<PartnerPerformance>>, ApiError> {
    service.partners().await.map(Json).map_err(load_error)
}

/// GET /api/v1/products
pub async fn get_products(
    State(service): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(usize::MAX);
    match service.products().await {
        Ok(products) => Ok(Json(ProductsResponse {
            products: products.into_iter().take(limit).collect(),
        })),
        Err(e) => Err(load_error(e)),
    }
}
