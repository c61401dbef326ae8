//! Error taxonomy shared by the prediction core and the HTTP boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    /// Malformed client input. Recovered at the boundary as a 4xx.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Artifact missing, malformed or mismatched. Fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unexpected failure inside scaling, expansion or inference.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PredictError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Label used for the request counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            PredictError::Validation(_) => "validation_error",
            PredictError::Configuration(_) | PredictError::Internal(_) => "internal_error",
        }
    }
}

pub type PredictResult<T> = Result<T, PredictError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// HTTP wrapper around [`PredictError`].
#[derive(Debug)]
pub struct ApiError(pub PredictError);

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            PredictError::Validation(msg) => {
                warn!("Rejected prediction request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            PredictError::Configuration(_) | PredictError::Internal(_) => {
                error!("Prediction failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal prediction error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = ApiError(PredictError::validation("bad")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError(PredictError::internal("boom")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = ApiError(PredictError::configuration("zero scale")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(PredictError::validation("x").outcome(), "validation_error");
        assert_eq!(PredictError::internal("x").outcome(), "internal_error");
        assert_eq!(PredictError::configuration("x").outcome(), "internal_error");
    }
}
