use axum::{Json, extract::Extension};
use serde::Serialize;
use std::sync::Arc;

use crate::app_state::models::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceDescription {
    pub message: String,
    pub version: &'static str,
    pub environment: String,
    pub window_size: usize,
    pub endpoints: [&'static str; 4],
}

/// Endpoint index - GET /
pub async fn root(Extension(app_state): Extension<Arc<AppState>>) -> Json<ServiceDescription> {
    let settings = &app_state.settings;
    let window_size = settings.app_config.model.window_size;

    Json(ServiceDescription {
        message: format!(
            "Next-day closing price predictor. POST {} closing prices to /predict.",
            window_size
        ),
        version: env!("CARGO_PKG_VERSION"),
        environment: settings.app_env.env.to_string(),
        window_size,
        endpoints: [
            "POST /predict",
            "GET /health",
            "GET /metrics",
            "GET /",
        ],
    })
}
