//! Offline preparation of price history: loading, feature engineering,
//! scaler fitting inputs, sequence windows and hold-out evaluation.

pub mod evaluation;
pub mod features;
pub mod history;
pub mod windows;

use crate::error::PredictError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("insufficient data: need at least {needed} rows, got {got}")]
    Insufficient { needed: usize, got: usize },

    #[error(transparent)]
    Model(#[from] PredictError),
}
