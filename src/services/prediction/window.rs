use crate::error::{PredictError, PredictResult};

/// Validated closing prices for one request, most recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow {
    prices: Vec<f64>,
}

impl PriceWindow {
    pub fn new(prices: &[f64], window_size: usize) -> PredictResult<Self> {
        if prices.len() != window_size {
            return Err(PredictError::validation(format!(
                "expected exactly {} closing prices, got {}",
                window_size,
                prices.len()
            )));
        }
        if let Some(i) = prices.iter().position(|p| !p.is_finite()) {
            return Err(PredictError::validation(format!(
                "price at position {} is not a finite number",
                i
            )));
        }
        if let Some(i) = prices.iter().position(|p| *p <= 0.0) {
            return Err(PredictError::validation(format!(
                "price at position {} must be positive, got {}",
                i, prices[i]
            )));
        }

        Ok(Self {
            prices: prices.to_vec(),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.prices
    }

    pub fn last(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }

    pub fn mean(&self) -> f64 {
        let n = self.prices.len() as f64;
        let sum: f64 = self.prices.iter().sum();
        if sum.is_finite() {
            sum / n
        } else {
            self.prices.iter().map(|p| p / n).sum()
        }
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.relative_std_dev() * self.mean()
    }

    /// Population standard deviation divided by the mean. Deviations are
    /// scaled before squaring, so this stays finite for any valid window.
    pub fn relative_std_dev(&self) -> f64 {
        let mean = self.mean();
        let n = self.prices.len() as f64;
        let variance = self
            .prices
            .iter()
            .map(|p| ((p - mean) / mean).powi(2) / n)
            .sum::<f64>();
        variance.sqrt()
    }
}
