//! # adfp Comparison Orchestrator (`compare`)
//!
//! ## Purpose
//!
//! `compare` sits on top of the pure hashing crate (`perceptual`). Given up to
//! ten competitor image URLs and, optionally, the id of a campaign whose
//! creatives were generated earlier, it:
//!
//! - fetches and fingerprints every input concurrently (bounded), reporting a
//!   per-input `ok`/`failed` status in request order,
//! - fingerprints the campaign's materialized creative images, silently
//!   skipping entries without a usable file,
//! - compares every hashed input against every hashed creative, and every
//!   unordered pair of hashed inputs,
//! - summarises how many pairs fall under the similarity threshold.
//!
//! Per-image failures (network, timeout, non-image content, undecodable
//! bytes) are reported in-band and never fail the request. A failing
//! reference lookup degrades to an empty reference set.
//!
//! ## Collaborators
//!
//! - [`ImageFetcher`]: byte source for input URLs. [`HttpImageFetcher`] is the
//!   production implementation; [`LocalFileFetcher`] serves local paths.
//! - [`ReferenceLookup`]: lists a campaign's creatives.
//!   [`DirectoryReferenceLookup`] reads `<root>/<reference_id>/`;
//!   [`InMemoryReferenceLookup`] holds fixed sets.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use compare::{
//!     Comparator, CompareConfig, ComparisonRequest, DirectoryReferenceLookup, HttpImageFetcher,
//! };
//! use perceptual::PerceptualConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CompareConfig::default();
//! let comparator = Comparator::new(
//!     PerceptualConfig::default(),
//!     cfg.clone(),
//!     Arc::new(HttpImageFetcher::new(&cfg)?),
//!     Arc::new(DirectoryReferenceLookup::new("generated")),
//! )?;
//!
//! let request = ComparisonRequest::new(["https://cdn.example.com/ad-1.jpg"])
//!     .with_reference("campaign-42");
//! let result = comparator.compare_images(request).await?;
//! println!("{} similar to our creatives", result.summary.similar_to_reference);
//! # Ok(())
//! # }
//! ```
mod comparator;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod reference;
pub mod types;

pub use crate::comparator::Comparator;
pub use crate::config::{CompareConfig, DEFAULT_USER_AGENT};
pub use crate::error::{CompareError, FetchError, LookupError};
pub use crate::fetch::{HttpImageFetcher, ImageFetcher, LocalFileFetcher};
pub use crate::metrics::{set_compare_metrics, CompareMetrics, ImageSource};
pub use crate::reference::{
    DirectoryReferenceLookup, InMemoryReferenceLookup, ReferenceLookup, MANIFEST_FILE,
};
pub use crate::types::{
    ComparisonRequest, ComparisonResult, ComparisonSummary, CrossComparison, ImageResult,
    ImageStatus, ReferenceAsset, ReferenceComparison,
};
