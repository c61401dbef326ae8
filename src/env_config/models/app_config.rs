use super::app_env::Env;
use crate::error::{PredictError, PredictResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    pub directory: String,
    pub model_file: String,
    pub scaler_file: String,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_feature_width")]
    pub feature_width: usize,
}

fn default_window_size() -> usize {
    60
}

fn default_feature_width() -> usize {
    9
}

impl AppConfig {
    /// Loads `config/<env>.toml`.
    pub fn new(env: &Env) -> PredictResult<Self> {
        Self::from_file(&Path::new("config").join(format!("{}.toml", env)))
    }

    pub fn from_file(path: &Path) -> PredictResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PredictError::configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> PredictResult<Self> {
        let config: AppConfig = toml::from_str(raw)
            .map_err(|e| PredictError::configuration(format!("invalid config: {}", e)))?;

        if config.model.window_size == 0 || config.model.feature_width == 0 {
            return Err(PredictError::configuration(
                "model.window_size and model.feature_width must be positive",
            ));
        }
        Ok(config)
    }
}

impl ModelConfig {
    pub fn model_path(&self, directory: &str) -> PathBuf {
        Path::new(directory).join(&self.model_file)
    }

    pub fn scaler_path(&self, directory: &str) -> PathBuf {
        Path::new(directory).join(&self.scaler_file)
    }
}
