use super::window::PriceWindow;
use crate::error::{PredictError, PredictResult};

const R2_EPSILON: f64 = 1e-8;

/// How far a prediction sits from the last price of its own input window.
///
/// This is a per-request sanity signal. It does not measure accuracy against
/// a realized future price; see `dataset::evaluation` for that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastPriceDeviation {
    pub absolute: f64,
    /// Square root of the squared difference, equal to `absolute`. Exported
    /// separately to keep the RMSE-style gauge populated.
    pub root_squared: f64,
    pub percent: f64,
    /// `1 - (last - predicted)^2 / ((last - mean)^2 + 1e-8)`
    pub pseudo_r2: f64,
}

impl LastPriceDeviation {
    pub fn compute(window: &PriceWindow, predicted: f64) -> PredictResult<Self> {
        deviation_from(window.last(), window.mean(), predicted)
    }
}

fn deviation_from(last: f64, mean: f64, predicted: f64) -> PredictResult<LastPriceDeviation> {
    if last == 0.0 {
        return Err(PredictError::internal(
            "last price is zero, percent deviation undefined",
        ));
    }

    let diff = last - predicted;

    // Terms are taken relative to `last` so squaring cannot overflow for
    // large prices. The epsilon is rescaled to keep the ratio unchanged.
    let rel_diff = diff / last;
    let rel_spread = (last - mean) / last;
    let rel_epsilon = R2_EPSILON / last / last;
    let ratio = rel_diff * rel_diff / (rel_spread * rel_spread + rel_epsilon);

    let deviation = LastPriceDeviation {
        absolute: diff.abs(),
        root_squared: diff.hypot(0.0),
        percent: saturate(rel_diff.abs() * 100.0),
        pseudo_r2: saturate(1.0 - ratio),
    };

    let all_finite = [
        deviation.absolute,
        deviation.root_squared,
        deviation.percent,
        deviation.pseudo_r2,
    ]
    .iter()
    .all(|v| v.is_finite());
    if !all_finite {
        return Err(PredictError::internal("deviation metrics are not finite"));
    }

    Ok(deviation)
}

/// Clamps an overflowed ratio to the largest finite value of the same sign.
/// NaN passes through.
fn saturate(value: f64) -> f64 {
    if value.is_infinite() {
        f64::MAX.copysign(value)
    } else {
        value
    }
}

/// Heuristic confidence in [0, 100]: `(1 - stdev / mean) * 100`.
pub fn confidence(window: &PriceWindow) -> PredictResult<f64> {
    let mean = window.mean();
    if mean == 0.0 || !mean.is_finite() {
        return Err(PredictError::internal(
            "mean price is zero, volatility undefined",
        ));
    }

    let volatility = window.relative_std_dev();
    Ok(((1.0 - volatility) * 100.0).clamp(0.0, 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
