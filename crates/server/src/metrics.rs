//! Prometheus export for the comparison metrics hooks.

use compare::{set_compare_metrics, CompareMetrics, ComparisonSummary, ImageSource};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Duration;

/// Forwards `compare` observations to the global `metrics` recorder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusCompareMetrics;

impl CompareMetrics for PrometheusCompareMetrics {
    fn record_image(&self, source: ImageSource, latency: Duration, ok: bool) {
        let outcome = if ok { "ok" } else { "failed" };
        ::metrics::counter!("adfp_images_total", "source" => source.as_str(), "outcome" => outcome)
            .increment(1);
        ::metrics::histogram!("adfp_image_latency_seconds", "source" => source.as_str())
            .record(latency.as_secs_f64());
    }

    fn record_reference_lookup(&self, ok: bool) {
        if !ok {
            ::metrics::counter!("adfp_reference_lookup_failures_total").increment(1);
        }
    }

    fn record_comparison(&self, latency: Duration, summary: &ComparisonSummary) {
        ::metrics::counter!("adfp_comparisons_total").increment(1);
        ::metrics::histogram!("adfp_comparison_latency_seconds").record(latency.as_secs_f64());
        ::metrics::counter!("adfp_similar_pairs_total", "kind" => "reference")
            .increment(summary.similar_to_reference as u64);
        ::metrics::counter!("adfp_similar_pairs_total", "kind" => "cross")
            .increment(summary.similar_cross as u64);
    }
}

/// Install the Prometheus recorder and route comparison metrics into it.
///
/// Only one global recorder can exist per process; a second call fails.
pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    set_compare_metrics(Some(Arc::new(PrometheusCompareMetrics)));
    Ok(handle)
}
