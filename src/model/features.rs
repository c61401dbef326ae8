use crate::error::{PredictError, PredictResult};
use ndarray::Array3;

/// Builds the `(1, window, feature_width)` tensor the network expects from a
/// single normalized price column.
///
/// Known approximation: the auxiliary features the network was trained with
/// (open/high/low/volume/moving averages) are not available at serving time,
/// so the price column is replicated into every feature slot. The deployed
/// weights were fitted against this broadcast representation; do not replace
/// it with real features without retraining.
pub fn expand(
    normalized: &[f64],
    window_size: usize,
    feature_width: usize,
) -> PredictResult<Array3<f64>> {
    if normalized.len() != window_size {
        return Err(PredictError::internal(format!(
            "feature expansion expects {} timesteps, got {}",
            window_size,
            normalized.len()
        )));
    }
    if feature_width == 0 {
        return Err(PredictError::internal("feature width must be positive"));
    }

    Ok(Array3::from_shape_fn(
        (1, window_size, feature_width),
        |(_, t, _)| normalized[t],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_replicates_each_timestep() {
        let window: Vec<f64> = (0..60).map(|i| i as f64 / 60.0).collect();
        let tensor = expand(&window, 60, 9).unwrap();

        assert_eq!(tensor.shape(), &[1, 60, 9]);
        for t in 0..60 {
            for f in 0..9 {
                assert_eq!(tensor[[0, t, f]], window[t]);
            }
        }
    }

    #[test]
    fn test_expand_rejects_wrong_length() {
        let window = vec![0.5; 59];
        assert!(matches!(
            expand(&window, 60, 9),
            Err(PredictError::Internal(_))
        ));
    }

    #[test]
    fn test_expand_rejects_zero_width() {
        let window = vec![0.5; 60];
        assert!(expand(&window, 60, 0).is_err());
    }
}
