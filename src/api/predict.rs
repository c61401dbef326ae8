use axum::{Json, extract::Extension};
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;

use crate::app_state::models::AppState;
use crate::error::{ApiError, PredictError};
use crate::services::prediction::PredictionResult;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub prices: Vec<f64>,
}

/// Next-close prediction - POST /predict
///
/// The forward pass is CPU-bound and runs on the blocking pool.
pub async fn predict(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictionResult>, ApiError> {
    let service = app_state.prediction_service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict(&request.prices))
        .await
        .map_err(|e| {
            error!("Prediction task failed: {}", e);
            PredictError::internal(format!("prediction task failed: {}", e))
        })??;

    Ok(Json(result))
}
