use super::{app_config::AppConfig, app_env::AppEnv};
use std::path::PathBuf;

#[derive(Debug)]
pub struct AppSettings {
    pub app_config: AppConfig,
    pub app_env: AppEnv,
}

impl AppSettings {
    /// `MODEL_DIR` wins over the configured directory.
    pub fn model_dir(&self) -> &str {
        self.app_env
            .model_dir
            .as_deref()
            .unwrap_or(&self.app_config.model.directory)
    }

    pub fn model_path(&self) -> PathBuf {
        self.app_config.model.model_path(self.model_dir())
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.app_config.model.scaler_path(self.model_dir())
    }
}
