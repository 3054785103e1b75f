//! Prometheus metrics for decode-service.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// The registry together with every metric registered in it.
pub struct Metrics {
    pub registry: Registry,
    pub decode_requests_total: IntCounterVec,
    pub provider_latency_seconds: HistogramVec,
    pub provider_errors_total: IntCounterVec,
    pub provider_tokens_total: IntCounterVec,
}

// Registry and metrics become visible together, never one without the other.
static METRICS: OnceLock<Metrics> = OnceLock::new();

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let decode_requests_total = IntCounterVec::new(
            Opts::new("decode_requests_total", "Total decode requests by outcome"),
            &["outcome"],
        )
        .expect("Failed to create decode_requests_total metric");

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "provider_latency_seconds",
                "AI provider API latency in seconds",
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
            &["provider", "model"],
        )
        .expect("Failed to create provider_latency_seconds metric");

        let provider_errors_total = IntCounterVec::new(
            Opts::new("provider_errors_total", "Total AI provider errors"),
            &["provider", "error_type"],
        )
        .expect("Failed to create provider_errors_total metric");

        // type: input, output
        let provider_tokens_total = IntCounterVec::new(
            Opts::new("provider_tokens_total", "Total tokens reported by the provider"),
            &["provider", "model", "type"],
        )
        .expect("Failed to create provider_tokens_total metric");

        registry
            .register(Box::new(decode_requests_total.clone()))
            .expect("Failed to register decode_requests_total");
        registry
            .register(Box::new(provider_latency_seconds.clone()))
            .expect("Failed to register provider_latency_seconds");
        registry
            .register(Box::new(provider_errors_total.clone()))
            .expect("Failed to register provider_errors_total");
        registry
            .register(Box::new(provider_tokens_total.clone()))
            .expect("Failed to register provider_tokens_total");

        tracing::info!("Prometheus metrics initialized");

        Self {
            registry,
            decode_requests_total,
            provider_latency_seconds,
            provider_errors_total,
            provider_tokens_total,
        }
    }
}

/// Initialize all metrics. Later and concurrent calls share the first result.
pub fn init_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}

/// The initialized metrics, if any.
pub fn metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match METRICS.get() {
        Some(m) => &m.registry,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let metric_families = registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record how a decode request ended.
pub fn record_decode_request(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.decode_requests_total.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors_total.with_label_values(&[provider, error_type]).inc();
    }
}

/// Record token usage.
pub fn record_tokens(provider: &str, model: &str, input_tokens: u32, output_tokens: u32) {
    if let Some(m) = METRICS.get() {
        m.provider_tokens_total
            .with_label_values(&[provider, model, "input"])
            .inc_by(input_tokens as u64);
        m.provider_tokens_total
            .with_label_values(&[provider, model, "output"])
            .inc_by(output_tokens as u64);
    }
}
