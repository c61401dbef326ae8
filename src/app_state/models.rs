use crate::env_config::models::app_setting::AppSettings;
use crate::metrics::PrometheusMetrics;
use crate::services::prediction::PredictionService;

use std::sync::Arc;

/// Process-wide state, built once before the listener binds and never
/// mutated afterwards.
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub prediction_service: Arc<PredictionService>,
    pub metrics: Arc<PrometheusMetrics>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        prediction_service: Arc<PredictionService>,
        metrics: Arc<PrometheusMetrics>,
    ) -> Self {
        Self {
            settings,
            prediction_service,
            metrics,
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.metrics.model_loaded.get() >= 1.0
    }
}
