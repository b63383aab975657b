use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser-like agent string; several ad CDNs refuse obvious bot agents.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Orchestrator and fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompareConfig {
    /// Upper bound on `image_urls` per request. Larger requests are rejected.
    pub max_images: usize,
    /// Per-fetch deadline in seconds.
    pub fetch_timeout_secs: u64,
    /// Images fetched and hashed at the same time.
    pub fetch_concurrency: usize,
    /// Response bodies above this size fail the fetch.
    pub max_image_bytes: usize,
    pub user_agent: String,
}

impl CompareConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.max_images = max_images;
        self
    }

    pub fn with_fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Effective concurrency; zero is treated as one.
    pub fn concurrency(&self) -> usize {
        self.fetch_concurrency.max(1)
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            max_images: 10,
            fetch_timeout_secs: 15,
            fetch_concurrency: 4,
            max_image_bytes: 20 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
