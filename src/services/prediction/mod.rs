pub mod diagnostics;
pub mod service;
pub mod window;

pub use service::{PredictionResult, PredictionService, PredictionStatus};
pub use window::PriceWindow;
