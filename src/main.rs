use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use stock_predictor::{
    api::create_application_router,
    app_state::models::AppState,
    env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings},
    logger,
    metrics::{MetricsSink, PrometheusMetrics},
    model::{FsArtifactSource, ModelArtifact},
    services::prediction::PredictionService,
};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let settings: Arc<AppSettings> = Arc::new(initialize_application());

    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .expect("Invalid server address configuration");

    info!("Server will listen on: {}", server_address);

    let metrics = Arc::new(PrometheusMetrics::new().expect("Failed to register metrics"));

    // Load-or-fail before accepting any request
    let prediction_service = initialize_prediction_service(&settings, metrics.clone()).await;
    metrics.set_model_loaded(true);

    let app_state: Arc<AppState> = Arc::new(AppState::new(
        settings.clone(),
        Arc::new(prediction_service),
        metrics,
    ));

    let app_router = create_application_router(app_state);

    start_http_server(app_router, server_address).await;

    info!("Server stopped");
}

/// Loads environment, configuration and logging
fn initialize_application() -> AppSettings {
    let environment = AppEnv::new().expect("Failed to read environment");
    let config = AppConfig::new(&environment.env).expect("Failed to load configuration");
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        !app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting stock predictor service...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    app_settings
}

/// Loads the model/scaler pair and wires the prediction service
async fn initialize_prediction_service(
    settings: &AppSettings,
    metrics: Arc<PrometheusMetrics>,
) -> PredictionService {
    let model_config = &settings.app_config.model;
    let source = FsArtifactSource::new(settings.model_path(), settings.scaler_path());

    info!(
        "Loading artifact from {} and {}",
        settings.model_path().display(),
        settings.scaler_path().display()
    );

    let artifact =
        match ModelArtifact::load(&source, model_config.window_size, model_config.feature_width)
            .await
        {
            Ok(artifact) => artifact,
            Err(err) => {
                error!("Failed to load model artifact: {}", err);
                panic!("Cannot serve predictions without a model artifact");
            }
        };

    info!("Model artifact loaded successfully");
    PredictionService::new(artifact, metrics)
}

/// Starts the HTTP server and runs until a shutdown signal arrives
async fn start_http_server(app: Router, addr: SocketAddr) {
    info!("Starting HTTP server on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to address {}: {}", addr, err);
            panic!("Cannot start server: {}", err);
        }
    };

    info!("Server started successfully, now accepting connections");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
        panic!("Server failed: {}", err);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
