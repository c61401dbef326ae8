//! Next-day closing price prediction served over HTTP.
//!
//! A pre-trained LSTM and the min-max scaler it was fitted with are loaded
//! once at startup; each request validates a 60-point price window, runs it
//! through the network and returns a price plus a volatility-based
//! confidence score.

pub mod api;
pub mod app_state;
pub mod dataset;
pub mod env_config;
pub mod error;
pub mod layers;
pub mod logger;
pub mod metrics;
pub mod model;
pub mod services;

pub use error::{ApiError, PredictError, PredictResult};
