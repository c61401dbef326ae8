use super::diagnostics::{LastPriceDeviation, confidence, round2};
use super::window::PriceWindow;
use crate::error::PredictResult;
use crate::metrics::MetricsSink;
use crate::model::{ModelArtifact, features};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    pub confidence: f64,
    pub status: PredictionStatus,
}

/// Validation, scaling, expansion, inference and derived metrics around one
/// model call. Holds only read-only state, so a single instance serves all
/// concurrent requests.
pub struct PredictionService {
    artifact: ModelArtifact,
    metrics: Arc<dyn MetricsSink>,
}

impl PredictionService {
    pub fn new(artifact: ModelArtifact, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { artifact, metrics }
    }

    pub fn window_size(&self) -> usize {
        self.artifact.model.window_size()
    }

    pub fn feature_width(&self) -> usize {
        self.artifact.model.feature_width()
    }

    /// Predicts the next close for `prices`. The request counter and latency
    /// histogram are updated on every call, deviation gauges only on success.
    pub fn predict(&self, prices: &[f64]) -> PredictResult<PredictionResult> {
        let request_id = Uuid::new_v4();
        let span = info_span!("predict", %request_id);
        let _enter = span.enter();

        let started = Instant::now();
        let result = self.run(prices);
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.outcome(),
        };
        self.metrics.record_request(outcome, started.elapsed());

        result
    }

    /// Raw next-close estimate for a validated window, in price units.
    pub fn forecast(&self, window: &PriceWindow) -> PredictResult<f64> {
        let scaler = &self.artifact.scaler;

        let normalized = scaler.transform(window.values())?;
        let tensor = features::expand(&normalized, self.window_size(), self.feature_width())?;
        let pred_scaled = self.artifact.model.infer(&tensor)?;

        scaler.inverse_transform(pred_scaled)
    }

    fn run(&self, prices: &[f64]) -> PredictResult<PredictionResult> {
        let window = PriceWindow::new(prices, self.window_size())?;
        let predicted = self.forecast(&window)?;

        let deviation = LastPriceDeviation::compute(&window, predicted)?;
        let confidence = confidence(&window)?;
        self.metrics.record_deviation(&deviation);

        debug!(
            "Predicted {:.4} (last {:.4}, abs deviation {:.4}, confidence {:.2})",
            predicted,
            window.last(),
            deviation.absolute,
            confidence
        );

        Ok(PredictionResult {
            predicted_price: round2(predicted),
            confidence: round2(confidence),
            status: PredictionStatus::Success,
        })
    }
}
