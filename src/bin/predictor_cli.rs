//! Operator tooling around the predictor: scaler fitting, request payloads
//! and hold-out evaluation, all from a local daily OHLCV CSV.

use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use stock_predictor::{
    dataset::{
        evaluation::evaluate_holdout,
        features::{CLOSE_INDEX, FEATURE_NAMES, engineer},
        history::{last_closes, load_history},
    },
    logger,
    metrics::PrometheusMetrics,
    model::{FsArtifactSource, ModelArtifact, ScalerState},
    services::prediction::PredictionService,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "predictor-cli", version, about = "Stock predictor operator tools")]
struct Cli {
    /// Log filter directive
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Engineer features from a CSV and write the fitted scaler as JSON
    FitScaler {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a /predict request body built from the latest closes
    Payload {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 60)]
        window: usize,
    },
    /// Score the model on the chronological hold-out tail of a CSV
    Evaluate {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        scaler: PathBuf,
        #[arg(long, default_value_t = 0.8)]
        train_fraction: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, "plain", false)?;

    match cli.command {
        Command::FitScaler { csv, out } => {
            let bars = load_history(&csv)?;
            let rows = engineer(&bars);
            let scaler = ScalerState::fit(&rows, CLOSE_INDEX)?;

            std::fs::write(&out, serde_json::to_string_pretty(&scaler)?)?;
            info!(
                "Fitted scaler on {} rows x {} features ({}), written to {}",
                rows.len(),
                FEATURE_NAMES.len(),
                FEATURE_NAMES.join(", "),
                out.display()
            );
        }
        Command::Payload { csv, window } => {
            let bars = load_history(&csv)?;
            let prices = last_closes(&bars, window)?;
            println!("{}", serde_json::to_string_pretty(&json!({ "prices": prices }))?);
        }
        Command::Evaluate {
            csv,
            model,
            scaler,
            train_fraction,
        } => {
            let source = FsArtifactSource::new(model, scaler);
            let artifact = ModelArtifact::load_self_described(&source).await?;
            let service = PredictionService::new(artifact, Arc::new(PrometheusMetrics::new()?));

            let bars = load_history(&csv)?;
            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            let report = evaluate_holdout(&service, &closes, train_fraction)?;

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
