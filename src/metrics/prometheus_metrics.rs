//! Prometheus metrics for the prediction service.
//!
//! All metrics use the `predictor_` prefix. Deviation gauges compare the
//! prediction with the last price of the request window; they are sanity
//! signals, not held-out accuracy.

use crate::services::prediction::diagnostics::LastPriceDeviation;
use prometheus::{CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::Arc;
use std::time::Duration;

/// Receives instrumentation from the prediction pipeline.
pub trait MetricsSink: Send + Sync {
    /// Counts one attempt and observes its latency, whatever the outcome.
    fn record_request(&self, outcome: &str, elapsed: Duration);

    /// Overwrites the last-value deviation gauges.
    fn record_deviation(&self, deviation: &LastPriceDeviation);

    fn set_model_loaded(&self, loaded: bool);
}

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Arc<Registry>,
    /// Prediction attempts by outcome
    pub requests_total: CounterVec,
    /// End-to-end prediction latency
    pub request_latency_seconds: Histogram,
    pub last_price_abs_deviation: Gauge,
    pub last_price_rms_deviation: Gauge,
    pub last_price_pct_deviation: Gauge,
    pub last_price_pseudo_r2: Gauge,
    /// 1 once the artifact pair is loaded
    pub model_loaded: Gauge,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = CounterVec::new(
            Opts::new("predictor_requests_total", "Prediction requests by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "predictor_request_latency_seconds",
                "Prediction request latency in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )?;
        registry.register(Box::new(request_latency_seconds.clone()))?;

        let last_price_abs_deviation = Gauge::with_opts(Opts::new(
            "predictor_last_price_abs_deviation",
            "Absolute difference between prediction and last input price",
        ))?;
        registry.register(Box::new(last_price_abs_deviation.clone()))?;

        let last_price_rms_deviation = Gauge::with_opts(Opts::new(
            "predictor_last_price_rms_deviation",
            "Root squared difference between prediction and last input price",
        ))?;
        registry.register(Box::new(last_price_rms_deviation.clone()))?;

        let last_price_pct_deviation = Gauge::with_opts(Opts::new(
            "predictor_last_price_pct_deviation",
            "Percent difference between prediction and last input price",
        ))?;
        registry.register(Box::new(last_price_pct_deviation.clone()))?;

        let last_price_pseudo_r2 = Gauge::with_opts(Opts::new(
            "predictor_last_price_pseudo_r2",
            "Pseudo R2 of the prediction against the last input price",
        ))?;
        registry.register(Box::new(last_price_pseudo_r2.clone()))?;

        let model_loaded = Gauge::with_opts(Opts::new(
            "predictor_model_loaded",
            "Whether the model artifact is loaded (0/1)",
        ))?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            request_latency_seconds,
            last_price_abs_deviation,
            last_price_rms_deviation,
            last_price_pct_deviation,
            last_price_pseudo_r2,
            model_loaded,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }
}

impl MetricsSink for PrometheusMetrics {
    fn record_request(&self, outcome: &str, elapsed: Duration) {
        self.requests_total.with_label_values(&[outcome]).inc();
        self.request_latency_seconds.observe(elapsed.as_secs_f64());
    }

    fn record_deviation(&self, deviation: &LastPriceDeviation) {
        self.last_price_abs_deviation.set(deviation.absolute);
        self.last_price_rms_deviation.set(deviation.root_squared);
        self.last_price_pct_deviation.set(deviation.percent);
        self.last_price_pseudo_r2.set(deviation.pseudo_r2);
    }

    fn set_model_loaded(&self, loaded: bool) {
        self.model_loaded.set(if loaded { 1.0 } else { 0.0 });
    }
}
