use crate::error::{PredictError, PredictResult};
use crate::model::runtime::{LstmModel, ModelRuntime};
use crate::model::scaler::ScalerState;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Where the trained network and its scaler come from.
#[async_trait]
pub trait ArtifactSource {
    async fn load_model(&self) -> PredictResult<LstmModel>;

    async fn load_scaler(&self) -> PredictResult<ScalerState>;
}

/// Reads both artifact files from local disk.
pub struct FsArtifactSource {
    model_path: PathBuf,
    scaler_path: PathBuf,
}

impl FsArtifactSource {
    pub fn new(model_path: impl Into<PathBuf>, scaler_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            scaler_path: scaler_path.into(),
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> PredictResult<T> {
    debug!("Reading artifact file {}", path.display());
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        PredictError::configuration(format!("failed to read {}: {}", path.display(), e))
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        PredictError::configuration(format!("failed to parse {}: {}", path.display(), e))
    })
}

#[async_trait]
impl ArtifactSource for FsArtifactSource {
    async fn load_model(&self) -> PredictResult<LstmModel> {
        read_json(&self.model_path).await
    }

    async fn load_scaler(&self) -> PredictResult<ScalerState> {
        read_json(&self.scaler_path).await
    }
}

/// Network and scaler from one training run. Immutable once loaded and
/// shared read-only across requests.
#[derive(Clone)]
pub struct ModelArtifact {
    pub model: Arc<dyn ModelRuntime>,
    pub scaler: Arc<ScalerState>,
}

impl ModelArtifact {
    /// Pairs a model and scaler after checking they agree on shape.
    /// Whether both came from the same training run cannot be verified here.
    pub fn new(
        model: Arc<dyn ModelRuntime>,
        scaler: Arc<ScalerState>,
        window_size: usize,
        feature_width: usize,
    ) -> PredictResult<Self> {
        if model.window_size() != window_size {
            return Err(PredictError::configuration(format!(
                "model window size {} does not match configured {}",
                model.window_size(),
                window_size
            )));
        }
        if model.feature_width() != feature_width {
            return Err(PredictError::configuration(format!(
                "model feature width {} does not match configured {}",
                model.feature_width(),
                feature_width
            )));
        }
        if scaler.len() != feature_width {
            return Err(PredictError::configuration(format!(
                "scaler has {} features but model expects {}",
                scaler.len(),
                feature_width
            )));
        }

        Ok(Self { model, scaler })
    }

    /// Loads both files and checks them against the configured shape.
    pub async fn load(
        source: &(dyn ArtifactSource + Send + Sync),
        window_size: usize,
        feature_width: usize,
    ) -> PredictResult<Self> {
        let artifact = Self::load_self_described(source).await?;
        Self::new(artifact.model, artifact.scaler, window_size, feature_width)
    }

    /// Loads both files, taking the expected shape from the model itself.
    pub async fn load_self_described(
        source: &(dyn ArtifactSource + Send + Sync),
    ) -> PredictResult<Self> {
        info!("Loading model artifact");
        let model = source.load_model().await?;
        let scaler = source.load_scaler().await?;
        info!(
            "Artifact loaded: window={}, features={}, price_index={}",
            model.window_size(),
            model.feature_width(),
            scaler.price_index()
        );

        let (window_size, feature_width) = (model.window_size(), model.feature_width());
        Self::new(Arc::new(model), Arc::new(scaler), window_size, feature_width)
    }
}
