//! Metrics collection for observability

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    Encoder, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use once_cell::sync::Lazy;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Upstream provider label values
pub mod provider {
    pub const VISION: &str = "vision";
    pub const SEARCH: &str = "search";
}

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    pub ingest_requests: CounterVec,
    pub query_requests: CounterVec,
    pub upstream_requests: CounterVec,
    pub upstream_request_duration: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ingest_requests = register_counter_vec_with_registry!(
            Opts::new("ingest_requests_total", "Total image ingest requests"),
            &["status"],
            registry
        )?;

        let query_requests = register_counter_vec_with_registry!(
            Opts::new("query_requests_total", "Total product query requests by outcome"),
            &["outcome"],
            registry
        )?;

        let upstream_requests = register_counter_vec_with_registry!(
            Opts::new("upstream_requests_total", "Total upstream provider calls"),
            &["provider", "outcome"],
            registry
        )?;

        let upstream_request_duration = register_histogram_vec_with_registry!(
            "upstream_request_duration_seconds",
            "Upstream provider call duration in seconds",
            &["provider"],
            registry
        )?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            ingest_requests,
            query_requests,
            upstream_requests,
            upstream_request_duration,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record an ingest request
    pub fn record_ingest(&self, success: bool) {
        let status = if success { "success" } else { "error" };
        self.ingest_requests.with_label_values(&[status]).inc();
    }

    /// Record a query by outcome label (`ok`, `not_found`, `upstream`, ...)
    pub fn record_query(&self, outcome: &str) {
        self.query_requests.with_label_values(&[outcome]).inc();
    }

    /// Record one upstream call and its latency
    pub fn record_upstream(&self, provider: &str, success: bool, elapsed_secs: f64) {
        let outcome = if success { "success" } else { "error" };
        self.upstream_requests
            .with_label_values(&[provider, outcome])
            .inc();
        self.upstream_request_duration
            .with_label_values(&[provider])
            .observe(elapsed_secs);
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
