use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use atelier_catalog::{GenerationReport, PlannedEntry};
use atelier_fulfillment::DownloadLink;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub currency: String,
    pub entries: Vec<PlannedEntry>,
    pub total: Decimal,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories/{id}", get(get_category))
        .route("/catalog/plan", get(get_plan))
        .route("/catalog/provision", post(provision_catalog))
        .route("/delivery/{customer_id}/link", post(create_download_link))
}

/// GET /categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<CategoryResponse> {
    Json(CategoryResponse {
        id,
        category: state.catalog.categories().category_for(id).to_string(),
    })
}

/// GET /catalog/plan
/// Prices every entry without provisioning anything
pub async fn get_plan(State(state): State<AppState>) -> Json<PlanResponse> {
    let entries = state.generator.plan(&state.catalog);
    let total = entries
        .iter()
        .try_fold(Decimal::ZERO, |sum, e| sum.checked_add(e.amount))
        .unwrap_or(Decimal::MAX);

    Json(PlanResponse {
        currency: state.generator.pricing().currency().to_string(),
        entries,
        total,
    })
}

/// POST /catalog/provision
/// 200 when every entry was provisioned, 207 when the report is partial
pub async fn provision_catalog(
    State(state): State<AppState>,
) -> (StatusCode, Json<GenerationReport>) {
    let report = state.generator.generate(&state.catalog, &state.shutdown).await;

    let status = if report.is_complete() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    (status, Json(report))
}

/// POST /delivery/{customer_id}/link
pub async fn create_download_link(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Result<Json<DownloadLink>, AppError> {
    let link = state
        .delivery
        .download_link(&customer_id, chrono::Utc::now())
        .await?;
    Ok(Json(link))
}
