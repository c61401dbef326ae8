use super::DatasetError;
use super::windows::{build_sequences, train_test_split};
use crate::error::PredictError;
use crate::services::prediction::{PredictionService, PriceWindow};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Out-of-sample accuracy on the held-out tail of a price history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldoutReport {
    pub samples: usize,
    /// Windows the service would reject, such as ones holding a zero close.
    pub skipped: usize,
    pub mae: f64,
    pub rmse: f64,
    /// Percent; samples with a zero true price are left out.
    pub mape: f64,
}

/// Replays the serving path over every held-out window of `closes` and
/// compares each prediction with the close that actually followed.
pub fn evaluate_holdout(
    service: &PredictionService,
    closes: &[f64],
    train_fraction: f64,
) -> Result<HoldoutReport, DatasetError> {
    let window = service.window_size();
    let (_, test) = train_test_split(build_sequences(closes, window), train_fraction);
    if test.is_empty() {
        return Err(DatasetError::Insufficient {
            needed: window + 2,
            got: closes.len(),
        });
    }

    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut pct_sum = 0.0;
    let mut pct_count = 0usize;
    let mut samples = 0usize;
    let mut skipped = 0usize;

    for (input, &actual) in test.inputs.iter().zip(&test.targets) {
        let price_window = match PriceWindow::new(input, window) {
            Ok(price_window) => price_window,
            Err(PredictError::Validation(msg)) => {
                debug!("Skipping hold-out window: {}", msg);
                skipped += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let predicted = service.forecast(&price_window)?;
        let diff = actual - predicted;
        samples += 1;

        abs_sum += diff.abs();
        sq_sum += diff * diff;
        if actual != 0.0 {
            pct_sum += (diff / actual).abs();
            pct_count += 1;
        }
    }

    if skipped > 0 {
        warn!("Skipped {} hold-out windows that failed validation", skipped);
    }
    if samples == 0 {
        return Err(DatasetError::Insufficient {
            needed: 1,
            got: samples,
        });
    }
    if pct_count < samples {
        warn!(
            "Skipped {} samples with zero true price in MAPE",
            samples - pct_count
        );
    }

    let n = samples as f64;
    let report = HoldoutReport {
        samples,
        skipped,
        mae: abs_sum / n,
        rmse: (sq_sum / n).sqrt(),
        mape: if pct_count == 0 {
            0.0
        } else {
            pct_sum / pct_count as f64 * 100.0
        },
    };

    info!(
        "Hold-out evaluation over {} samples: MAE={:.4} RMSE={:.4} MAPE={:.4}%",
        report.samples, report.mae, report.rmse, report.mape
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::PrometheusMetrics;
    use crate::model::test_support::{constant_model_file, fixture_scaler};
    use crate::model::{LstmModel, ModelArtifact};
    use std::sync::Arc;

    fn service(output: f64) -> PredictionService {
        let model = LstmModel::try_from(constant_model_file(60, 9, output)).unwrap();
        let artifact =
            ModelArtifact::new(Arc::new(model), Arc::new(fixture_scaler(9)), 60, 9).unwrap();
        PredictionService::new(artifact, Arc::new(PrometheusMetrics::new().unwrap()))
    }

    #[test]
    fn test_constant_prediction_errors() {
        // Model always answers 150; hold-out targets alternate 140 / 160.
        let closes: Vec<f64> = (0..110)
            .map(|i| if i % 2 == 0 { 140.0 } else { 160.0 })
            .collect();
        let report = evaluate_holdout(&service(0.5), &closes, 0.8).unwrap();

        assert_eq!(report.samples, 10);
        assert_eq!(report.skipped, 0);
        assert!((report.mae - 10.0).abs() < 1e-9);
        assert!((report.rmse - 10.0).abs() < 1e-9);
        let expected_mape = (10.0 / 140.0 + 10.0 / 160.0) / 2.0 * 100.0;
        assert!((report.mape - expected_mape).abs() < 1e-9);
    }

    #[test]
    fn test_zero_close_inside_holdout_is_skipped() {
        // Targets are closes 100..110; close 100 is zero and sits inside
        // the input window of every later target.
        let mut closes = vec![150.0; 110];
        closes[100] = 0.0;
        let report = evaluate_holdout(&service(0.5), &closes, 0.8).unwrap();

        assert_eq!(report.skipped, 9);
        assert_eq!(report.samples, 1);
        assert!((report.mae - 150.0).abs() < 1e-9);
        assert_eq!(report.mape, 0.0);
    }

    #[test]
    fn test_every_window_invalid() {
        let mut closes = vec![150.0; 110];
        closes[95] = 0.0;
        assert!(matches!(
            evaluate_holdout(&service(0.5), &closes, 0.8),
            Err(DatasetError::Insufficient { .. })
        ));
    }

    #[test]
    fn test_too_short_history() {
        let closes = vec![150.0; 60];
        assert!(matches!(
            evaluate_holdout(&service(0.5), &closes, 0.8),
            Err(DatasetError::Insufficient { .. })
        ));
    }
}
