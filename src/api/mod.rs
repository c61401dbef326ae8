mod health_api;
mod metrics;
mod predict;
mod root;

pub use health_api::health_api;
pub use metrics::metrics;
pub use predict::predict;
pub use root::root;

use crate::app_state::models::AppState;
use crate::layers::{create_cors, create_trace};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Creates the API router with all endpoints and middleware
pub fn create_application_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_api))
        .route("/predict", post(predict))
        .route("/metrics", get(metrics))
        .layer(axum::Extension(app_state))
        .layer(create_cors())
        .layer(create_trace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_config::models::{
        app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings,
    };
    use crate::metrics::{MetricsSink, PrometheusMetrics};
    use crate::model::test_support::{constant_model_file, fixture_scaler};
    use crate::model::{LstmModel, ModelArtifact};
    use crate::services::prediction::PredictionService;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const CONFIG: &str = r#"
[log]
level = "info"
format = "plain"

[model]
directory = "artifacts"
model_file = "lstm_model.json"
scaler_file = "scaler.json"
"#;

    fn test_router() -> Router {
        let app_env = AppEnv::from_lookup(|name| match name {
            "ENV" => Some("local".to_string()),
            "SERVER_PORT" => Some("8000".to_string()),
            "SERVER_ADDRESS" => Some("127.0.0.1".to_string()),
            _ => None,
        })
        .unwrap();
        let settings = Arc::new(AppSettings {
            app_config: AppConfig::from_toml_str(CONFIG).unwrap(),
            app_env,
        });

        let model = LstmModel::try_from(constant_model_file(60, 9, 0.52)).unwrap();
        let artifact =
            ModelArtifact::new(Arc::new(model), Arc::new(fixture_scaler(9)), 60, 9).unwrap();
        let metrics = Arc::new(PrometheusMetrics::new().unwrap());
        metrics.set_model_loaded(true);
        let service = Arc::new(PredictionService::new(artifact, metrics.clone()));

        create_application_router(Arc::new(AppState::new(settings, service, metrics)))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    fn post_prices(prices: &[f64]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "prices": prices }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_predict_success() {
        let mut prices = vec![150.0; 59];
        prices.push(160.0);

        let (status, body) = send(test_router(), post_prices(&prices)).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["predicted_price"], 152.0);
        assert_eq!(body["confidence"], 99.15);
    }

    #[tokio::test]
    async fn test_predict_wrong_length_is_bad_request() {
        let (status, body) = send(test_router(), post_prices(&[150.0; 45])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&body).unwrap();
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("exactly 60"), "detail was {}", detail);
    }

    #[tokio::test]
    async fn test_predict_malformed_body_is_client_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/predict")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"prices": "many"}"#))
            .unwrap();
        let (status, _) = send(test_router(), request).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_health_reports_model_loaded() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(test_router(), request).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "status": "healthy", "model_loaded": true }));
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(test_router(), request).await;

        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert!(
            body["endpoints"]
                .as_array()
                .unwrap()
                .contains(&json!("POST /predict"))
        );
        assert_eq!(body["environment"], "local");
        assert_eq!(body["window_size"], 60);
        assert!(body["message"].as_str().unwrap().contains("POST 60"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_parallel_predictions() {
        let router = test_router();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let router = router.clone();
                let prices: Vec<f64> = (0..60).map(|j| 140.0 + (i + j) as f64 * 0.1).collect();
                tokio::spawn(async move { send(router, post_prices(&prices)).await })
            })
            .collect();

        for task in tasks {
            let (status, body) = task.await.unwrap();
            assert_eq!(status, StatusCode::OK);
            let body: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(body["predicted_price"], 152.0);
        }
    }

    #[tokio::test]
    async fn test_metrics_after_requests() {
        let router = test_router();
        send(router.clone(), post_prices(&[150.0; 60])).await;
        send(router.clone(), post_prices(&[150.0; 61])).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, body) = send(router, request).await;
        assert_eq!(status, StatusCode::OK);

        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("predictor_requests_total{outcome=\"success\"} 1"));
        assert!(text.contains("predictor_requests_total{outcome=\"validation_error\"} 1"));
        assert!(text.contains("predictor_model_loaded 1"));
        assert!(text.contains("predictor_last_price_abs_deviation 2"));
    }
}
