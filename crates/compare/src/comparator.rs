//! The comparison pass: fetch, fingerprint, compare, summarise.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use perceptual::{compare_fingerprints, ImageFingerprint, PerceptualConfig, Similarity};
use std::sync::Arc;
use std::time::Instant;

use crate::config::CompareConfig;
use crate::error::{CompareError, FetchError, ImageError};
use crate::fetch::{read_capped, ImageFetcher};
use crate::metrics::{metrics_recorder, ImageSource};
use crate::reference::ReferenceLookup;
use crate::types::{
    ComparisonRequest, ComparisonResult, ComparisonSummary, CrossComparison, ImageResult,
    ImageStatus, ReferenceAsset, ReferenceComparison,
};

/// Drives one comparison request end to end.
///
/// Stateless between calls: nothing is cached and nothing is written. Per-image
/// failures never fail the request; only request validation does.
pub struct Comparator {
    perceptual: PerceptualConfig,
    config: CompareConfig,
    fetcher: Arc<dyn ImageFetcher>,
    references: Arc<dyn ReferenceLookup>,
}

impl Comparator {
    pub fn new(
        perceptual: PerceptualConfig,
        config: CompareConfig,
        fetcher: Arc<dyn ImageFetcher>,
        references: Arc<dyn ReferenceLookup>,
    ) -> Result<Self, CompareError> {
        perceptual
            .validate()
            .map_err(|err| CompareError::Config(err.to_string()))?;
        Ok(Self {
            perceptual,
            config,
            fetcher,
            references,
        })
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn perceptual_config(&self) -> &PerceptualConfig {
        &self.perceptual
    }

    /// Fingerprint every input, compare inputs against each other and against
    /// the reference set, and summarise.
    ///
    /// The `images` list always has one entry per input URL, in request order.
    /// A reference lookup failure degrades to an empty reference set.
    pub async fn compare_images(
        &self,
        request: ComparisonRequest,
    ) -> Result<ComparisonResult, CompareError> {
        request.validate(self.config.max_images)?;
        let started = Instant::now();

        let (inputs, references) = futures::join!(
            self.fingerprint_inputs(&request.image_urls),
            self.fingerprint_references(request.reference_id()),
        );

        let mut images = Vec::with_capacity(inputs.len());
        let mut hashed: Vec<(String, ImageFingerprint)> = Vec::with_capacity(inputs.len());
        for (url, outcome) in inputs {
            match outcome {
                Ok(fingerprint) => {
                    images.push(ImageResult {
                        url: url.clone(),
                        fingerprint: Some(fingerprint.to_hex()),
                        status: ImageStatus::Ok,
                        error: None,
                    });
                    hashed.push((url, fingerprint));
                }
                Err(err) => images.push(ImageResult {
                    url,
                    fingerprint: None,
                    status: ImageStatus::Failed,
                    error: Some(err.to_string()),
                }),
            }
        }

        let mut reference_comparisons = Vec::with_capacity(references.len() * hashed.len());
        for (asset, reference) in &references {
            for (url, fingerprint) in &hashed {
                let sim = self.score(fingerprint, reference)?;
                reference_comparisons.push(ReferenceComparison {
                    image_url: url.clone(),
                    creative_id: asset.creative_id.clone(),
                    creative_provider: asset.provider.clone(),
                    creative_version: asset.version,
                    distance: sim.distance,
                    similarity_percent: sim.similarity_percent,
                    is_similar: sim.is_similar,
                });
            }
        }

        let mut cross_comparisons = Vec::new();
        for (i, (url_a, fp_a)) in hashed.iter().enumerate() {
            for (url_b, fp_b) in &hashed[i + 1..] {
                let sim = self.score(fp_a, fp_b)?;
                cross_comparisons.push(CrossComparison {
                    image_a: url_a.clone(),
                    image_b: url_b.clone(),
                    distance: sim.distance,
                    similarity_percent: sim.similarity_percent,
                    is_similar: sim.is_similar,
                });
            }
        }

        let summary = ComparisonSummary {
            total_images: request.image_urls.len(),
            hashed_successfully: hashed.len(),
            similar_to_reference: reference_comparisons
                .iter()
                .filter(|c| c.is_similar)
                .count(),
            similar_cross: cross_comparisons.iter().filter(|c| c.is_similar).count(),
        };

        let latency = started.elapsed();
        tracing::info!(
            total_images = summary.total_images,
            hashed = summary.hashed_successfully,
            references = references.len(),
            similar_to_reference = summary.similar_to_reference,
            similar_cross = summary.similar_cross,
            duration_ms = %latency.as_millis(),
            "image comparison complete"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_comparison(latency, &summary);
        }

        Ok(ComparisonResult {
            images,
            reference_comparisons,
            cross_comparisons,
            summary,
        })
    }

    fn score(&self, a: &ImageFingerprint, b: &ImageFingerprint) -> Result<Similarity, CompareError> {
        compare_fingerprints(a, b, self.perceptual.similarity_threshold).map_err(|err| {
            tracing::error!(error = %err, "fingerprints produced under different hash settings");
            CompareError::Fingerprint(err)
        })
    }

    /// Results come back in input order regardless of completion order.
    async fn fingerprint_inputs(
        &self,
        urls: &[String],
    ) -> Vec<(String, Result<ImageFingerprint, ImageError>)> {
        stream::iter(urls.iter().map(|url| async move {
            let started = Instant::now();
            let outcome = self.fingerprint_url(url).await;
            if let Some(recorder) = metrics_recorder() {
                recorder.record_image(ImageSource::Input, started.elapsed(), outcome.is_ok());
            }
            if let Err(err) = &outcome {
                tracing::warn!(url = %url, error = %err, "input image failed");
            }
            (url.clone(), outcome)
        }))
        .buffered(self.config.concurrency())
        .collect()
        .await
    }

    async fn fingerprint_url(&self, url: &str) -> Result<ImageFingerprint, ImageError> {
        let timeout = self.config.fetch_timeout();
        let bytes = tokio::time::timeout(timeout, self.fetcher.fetch(url, timeout))
            .await
            .map_err(|_| FetchError::Timeout(timeout.as_secs()))??;
        self.hash(bytes).await
    }

    /// Reference creatives that could be fingerprinted, in listing order.
    async fn fingerprint_references(
        &self,
        reference_id: Option<&str>,
    ) -> Vec<(ReferenceAsset, ImageFingerprint)> {
        let Some(reference_id) = reference_id else {
            return Vec::new();
        };

        let assets = match self.references.list_creative_images(reference_id).await {
            Ok(assets) => {
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_reference_lookup(true);
                }
                assets
            }
            Err(err) => {
                tracing::warn!(
                    reference_id,
                    error = %err,
                    "reference lookup failed; comparing without reference set"
                );
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_reference_lookup(false);
                }
                return Vec::new();
            }
        };

        let listed = assets.len();
        let usable: Vec<(ReferenceAsset, ImageFingerprint)> =
            stream::iter(assets.into_iter().map(|asset| async move {
                let Some(path) = asset.image_path.clone() else {
                    return None;
                };
                let started = Instant::now();
                let outcome = match read_capped(&path, self.config.max_image_bytes).await {
                    Ok(raw) => self.hash(raw).await,
                    Err(err) => Err(ImageError::Fetch(err)),
                };
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_image(
                        ImageSource::Reference,
                        started.elapsed(),
                        outcome.is_ok(),
                    );
                }
                match outcome {
                    Ok(fingerprint) => Some((asset, fingerprint)),
                    Err(err) => {
                        tracing::debug!(
                            creative_id = %asset.creative_id,
                            path = %path.display(),
                            error = %err,
                            "reference image unreadable"
                        );
                        None
                    }
                }
            }))
            .buffered(self.config.concurrency())
            .filter_map(|item| async move { item })
            .collect()
            .await;

        let skipped = listed - usable.len();
        if skipped > 0 {
            tracing::info!(
                reference_id,
                listed,
                skipped,
                "skipped reference creatives without a usable image"
            );
        }
        usable
    }

    /// Decode and hash on the blocking pool.
    async fn hash(&self, bytes: Bytes) -> Result<ImageFingerprint, ImageError> {
        let cfg = self.perceptual.clone();
        tokio::task::spawn_blocking(move || perceptual::fingerprint_bytes(&bytes, &cfg))
            .await
            .map_err(|err| ImageError::Join(err.to_string()))?
            .map_err(ImageError::from)
    }
}
