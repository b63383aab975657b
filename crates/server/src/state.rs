use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use compare::{Comparator, DirectoryReferenceLookup, HttpImageFetcher, ImageFetcher, ReferenceLookup};
use dashmap::DashMap;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, Instant)>>,

    /// Comparison orchestrator (shared across requests)
    pub comparator: Arc<Comparator>,

    /// Render handle of the installed Prometheus recorder, if any
    pub prometheus: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create state backed by the HTTP fetcher and the on-disk reference store
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let fetcher = HttpImageFetcher::new(&config.compare)
            .map_err(|err| ServerError::Config(format!("http client: {err}")))?;
        let references = DirectoryReferenceLookup::new(config.reference_root.clone());
        Self::with_components(config, Arc::new(fetcher), Arc::new(references))
    }

    /// Create state with explicit collaborators
    pub fn with_components(
        config: ServerConfig,
        fetcher: Arc<dyn ImageFetcher>,
        references: Arc<dyn ReferenceLookup>,
    ) -> ServerResult<Self> {
        let comparator = Comparator::new(
            config.perceptual.clone(),
            config.compare.clone(),
            fetcher,
            references,
        )
        .map_err(|err| ServerError::Config(err.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            rate_limiter: Arc::new(DashMap::new()),
            comparator: Arc::new(comparator),
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = Instant::now();
        let window = Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}
