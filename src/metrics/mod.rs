//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_with_registry, CounterVec, Encoder,
    Histogram, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    /// Scores computed, by scoring model
    pub product_scores: CounterVec,

    /// Reports produced, by variant and recovery stage
    pub reports_generated: CounterVec,

    /// Generation failures surfaced to callers, by error code
    pub generation_failures: CounterVec,

    /// Wall time of generative-text calls
    pub llm_request_duration: Histogram,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let product_scores = register_counter_vec_with_registry!(
            Opts::new("product_scores_total", "Total product viability scores computed"),
            &["model"],
            registry
        )?;

        let reports_generated = register_counter_vec_with_registry!(
            Opts::new("reports_generated_total", "Total reports generated"),
            &["variant", "stage"],
            registry
        )?;

        let generation_failures = register_counter_vec_with_registry!(
            Opts::new(
                "report_generation_failures_total",
                "Total report generations that failed before producing a report"
            ),
            &["kind"],
            registry
        )?;

        let llm_request_duration = register_histogram_with_registry!(
            "llm_request_duration_seconds",
            "Generative-text request duration in seconds",
            vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 45.0, 60.0],
            registry
        )?;

        Ok(Self {
            registry,
            product_scores,
            reports_generated,
            generation_failures,
            llm_request_duration,
        })
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        if encoder.encode(&families, &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let metrics = Metrics::new().unwrap();

        metrics.product_scores.with_label_values(&["standard"]).inc();
        metrics
            .reports_generated
            .with_label_values(&["professional", "fallback"])
            .inc();

        let rendered = metrics.render();
        assert!(rendered.contains("product_scores_total"));
        assert!(rendered.contains("reports_generated_total"));
    }
}
