use axum::{extract::Extension, http::header, response::IntoResponse};
use std::sync::Arc;

use crate::app_state::models::AppState;

/// Prometheus text exposition - GET /metrics
pub async fn metrics(Extension(app_state): Extension<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        app_state.metrics.render(),
    )
}
