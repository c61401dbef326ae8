use crate::error::{PredictError, PredictResult};
use serde::{Deserialize, Serialize};

/// Fitted min-max transform, one entry per trained feature.
///
/// Stored with the usual min-max convention: `offset` is the fitted `min_`
/// and `scale` is `1 / (data_max - data_min)`, so
/// `normalized = raw * scale + offset = (raw - data_min) * scale`
/// and `raw = (normalized - offset) / scale`.
///
/// Client windows carry closing prices only; those go through the entry at
/// `price_index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScalerFile")]
pub struct ScalerState {
    offset: Vec<f64>,
    scale: Vec<f64>,
    price_index: usize,
}

#[derive(Deserialize)]
struct ScalerFile {
    offset: Vec<f64>,
    scale: Vec<f64>,
    #[serde(default)]
    price_index: usize,
}

impl TryFrom<ScalerFile> for ScalerState {
    type Error = PredictError;

    fn try_from(file: ScalerFile) -> Result<Self, Self::Error> {
        ScalerState::new(file.offset, file.scale, file.price_index)
    }
}

impl ScalerState {
    pub fn new(offset: Vec<f64>, scale: Vec<f64>, price_index: usize) -> PredictResult<Self> {
        if offset.is_empty() || offset.len() != scale.len() {
            return Err(PredictError::configuration(format!(
                "scaler vectors must be non-empty and parallel (offset={}, scale={})",
                offset.len(),
                scale.len()
            )));
        }
        if price_index >= scale.len() {
            return Err(PredictError::configuration(format!(
                "price_index {} out of range for {} features",
                price_index,
                scale.len()
            )));
        }
        if let Some(i) = offset.iter().position(|v| !v.is_finite()) {
            return Err(PredictError::configuration(format!(
                "offset[{}] is not finite",
                i
            )));
        }
        if let Some(i) = scale.iter().position(|v| *v == 0.0 || !v.is_finite()) {
            return Err(PredictError::configuration(format!(
                "scale[{}] must be finite and nonzero",
                i
            )));
        }

        Ok(Self {
            offset,
            scale,
            price_index,
        })
    }

    /// Fits a per-column min-max transform over `rows` (one row per day).
    /// A constant column gets scale 1 so the nonzero-scale invariant holds.
    pub fn fit(rows: &[Vec<f64>], price_index: usize) -> PredictResult<Self> {
        let width = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(PredictError::validation(
                    "cannot fit a scaler on an empty dataset",
                ));
            }
        };

        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];

        for (n, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(PredictError::validation(format!(
                    "row {} has {} columns, expected {}",
                    n,
                    row.len(),
                    width
                )));
            }
            for (col, &value) in row.iter().enumerate() {
                if !value.is_finite() {
                    return Err(PredictError::validation(format!(
                        "row {} column {} is not finite",
                        n, col
                    )));
                }
                min[col] = min[col].min(value);
                max[col] = max[col].max(value);
            }
        }

        let scale: Vec<f64> = min
            .iter()
            .zip(&max)
            .map(|(lo, hi)| {
                let range = hi - lo;
                if range == 0.0 { 1.0 } else { 1.0 / range }
            })
            .collect();
        let offset = min.iter().zip(&scale).map(|(lo, s)| -lo * s).collect();

        Self::new(offset, scale, price_index)
    }

    /// Number of features the scaler was fitted on.
    pub fn len(&self) -> usize {
        self.scale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty()
    }

    pub fn price_index(&self) -> usize {
        self.price_index
    }

    fn price_params(&self) -> PredictResult<(f64, f64)> {
        let scale = self.scale[self.price_index];
        if scale == 0.0 || !scale.is_finite() {
            return Err(PredictError::configuration(format!(
                "scale[{}] is zero, refusing to normalize",
                self.price_index
            )));
        }
        Ok((self.offset[self.price_index], scale))
    }

    /// Maps raw closing prices into the normalized domain.
    pub fn transform(&self, raw: &[f64]) -> PredictResult<Vec<f64>> {
        let (offset, scale) = self.price_params()?;
        Ok(raw.iter().map(|x| x * scale + offset).collect())
    }

    /// Exact algebraic inverse of [`ScalerState::transform`] for one value.
    pub fn inverse_transform(&self, normalized: f64) -> PredictResult<f64> {
        let (offset, scale) = self.price_params()?;
        Ok((normalized - offset) / scale)
    }
}
