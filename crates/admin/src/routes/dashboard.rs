//! Dashboard route handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// GET /dashboard/stats - the full dashboard payload in one call.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = state.dashboard().stats().await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}

/// GET /dashboard/insights - month-over-month growth.
#[instrument(skip(state))]
pub async fn insights(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let insights = state.dashboard().insights().await?;

    Ok(Json(json!({ "success": true, "data": insights })))
}
