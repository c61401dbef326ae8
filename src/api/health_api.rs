use axum::{Json, extract::Extension};
use serde::Serialize;
use std::sync::Arc;

use crate::app_state::models::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

pub async fn health_api(Extension(app_state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: app_state.model_loaded(),
    })
}
