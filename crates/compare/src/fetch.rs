//! Byte sources for input images.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use std::time::Duration;

use crate::config::CompareConfig;
use crate::error::FetchError;

/// Extensions accepted when a server mislabels an image's content type.
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".webp"];

/// Retrieves the raw bytes behind an image locator.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError>;
}

/// HTTP(S) fetcher with a browser-like user agent and redirect following.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
    max_image_bytes: usize,
}

impl HttpImageFetcher {
    pub fn new(cfg: &CompareConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .connect_timeout(cfg.fetch_timeout().min(Duration::from_secs(10)))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self {
            client,
            max_image_bytes: cfg.max_image_bytes,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout(timeout.as_secs())
            } else {
                FetchError::Request(e.to_string())
            }
        };

        let mut response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !looks_like_image(&content_type, url) {
            return Err(FetchError::NotAnImage { content_type });
        }

        let limit = self.max_image_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await.map_err(map_err)? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}

/// Reads images from the local filesystem; accepts plain paths and
/// `file://` locators.
#[derive(Debug, Clone)]
pub struct LocalFileFetcher {
    max_image_bytes: usize,
}

impl LocalFileFetcher {
    pub fn new(cfg: &CompareConfig) -> Self {
        Self {
            max_image_bytes: cfg.max_image_bytes,
        }
    }
}

#[async_trait]
impl ImageFetcher for LocalFileFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Bytes, FetchError> {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        read_capped(path, self.max_image_bytes).await
    }
}

/// Read a local file, refusing anything larger than `limit` bytes.
pub(crate) async fn read_capped(path: &Path, limit: usize) -> Result<Bytes, FetchError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > limit as u64 {
        return Err(FetchError::TooLarge { limit });
    }
    Ok(Bytes::from(tokio::fs::read(path).await?))
}

/// Content type says image, or the URL path carries a raster extension.
pub(crate) fn looks_like_image(content_type: &str, url: &str) -> bool {
    if content_type.contains("image") {
        return true;
    }
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
