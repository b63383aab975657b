// Metrics hooks for the `compare` crate.
//
// Callers install a global `CompareMetrics` implementation via
// [`set_compare_metrics`]; every `Comparator` then reports per-image latency
// and outcome, reference lookup failures, and per-request summaries. This
// keeps instrumentation decoupled from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

use crate::types::ComparisonSummary;

/// Where an image being fingerprinted came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Input,
    Reference,
}

impl ImageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSource::Input => "input",
            ImageSource::Reference => "reference",
        }
    }
}

/// Metrics observer for comparison passes.
pub trait CompareMetrics: Send + Sync {
    /// One image fetched (or read) and fingerprinted; `ok` is false when it
    /// ended up failed or skipped.
    fn record_image(&self, source: ImageSource, latency: Duration, ok: bool);

    /// Outcome of the reference-set lookup.
    fn record_reference_lookup(&self, ok: bool);

    /// End of one `compare_images` call.
    fn record_comparison(&self, latency: Duration, summary: &ComparisonSummary);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn CompareMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn CompareMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn CompareMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global comparison metrics recorder.
///
/// Typically called once during service startup.
pub fn set_compare_metrics(recorder: Option<Arc<dyn CompareMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
