//! Stock route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::services::stock::StockUpdateRequest;
use crate::state::AppState;

/// GET /stock/status - every active product with its status band.
#[instrument(skip(state))]
pub async fn status(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let entries = state.stock().status().await?;

    Ok(Json(json!({ "status": "SUCCESS", "data": entries })))
}

/// PUT /stock/bulk-update request body.
#[derive(Debug, Deserialize)]
pub struct BulkUpdateBody {
    #[serde(default)]
    pub updates: Option<Vec<StockUpdateRequest>>,
}

/// PUT /stock/bulk-update - apply a batch of quantity changes.
///
/// Always 200 once the batch is accepted; per-item success and failure
/// are reported in the body.
#[instrument(skip(state, body))]
pub async fn bulk_update(
    State(state): State<AppState>,
    Json(body): Json<BulkUpdateBody>,
) -> Result<impl IntoResponse, AppError> {
    let updates = body
        .updates
        .ok_or_else(|| AppError::Validation("Updates array is required".to_string()))?;

    let report = state.stock().bulk_update(updates).await?;

    Ok(Json(json!({
        "status": "SUCCESS",
        "message": format!("Updated {} products", report.updated),
        "data": report,
    })))
}
