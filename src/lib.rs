//! Workspace umbrella crate for adfp (ad creative perceptual fingerprinting).
//!
//! Re-exports the hashing layer ([`perceptual`]) and the comparison
//! orchestrator ([`compare`]) so callers can depend on one crate, and adds
//! local-file helpers used by the `adfp` command-line tool.
//!
//! ```no_run
//! use adfp::{fingerprint_file, PerceptualConfig};
//!
//! let fp = fingerprint_file("creative.png", &PerceptualConfig::default())?;
//! println!("{fp}");
//! # Ok::<(), adfp::FileError>(())
//! ```

pub use compare::{
    Comparator, CompareConfig, CompareError, CompareMetrics, ComparisonRequest, ComparisonResult,
    ComparisonSummary, CrossComparison, DirectoryReferenceLookup, FetchError, HttpImageFetcher,
    ImageFetcher, ImageResult, ImageSource, ImageStatus, InMemoryReferenceLookup,
    LocalFileFetcher, LookupError, ReferenceAsset, ReferenceComparison, ReferenceLookup,
    set_compare_metrics,
};
pub use perceptual::{
    DEFAULT_SIMILARITY_THRESHOLD, HashAlgorithm, ImageFingerprint, PerceptualConfig,
    PerceptualError, Similarity, compare_fingerprints, fingerprint_bytes, hamming_distance,
    is_similar, similarity_percent,
};

use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Failure to fingerprint one local file.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fingerprint {}: {source}", path.display())]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: PerceptualError,
    },
}

/// Read and fingerprint one image file.
pub fn fingerprint_file(
    path: impl AsRef<Path>,
    cfg: &PerceptualConfig,
) -> Result<ImageFingerprint, FileError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    fingerprint_bytes(&bytes, cfg).map_err(|source| FileError::Fingerprint {
        path: path.to_path_buf(),
        source,
    })
}

/// Fingerprint many files, one result per path in input order.
///
/// Files are read and hashed on the rayon pool when `cfg.use_parallel` is set.
pub fn fingerprint_files<P>(paths: &[P], cfg: &PerceptualConfig) -> Vec<Result<ImageFingerprint, FileError>>
where
    P: AsRef<Path> + Sync,
{
    let hash_one = |p: &P| {
        let result = fingerprint_file(p, cfg);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "skipping unreadable image");
        }
        result
    };
    if cfg.use_parallel {
        paths.par_iter().map(hash_one).collect()
    } else {
        paths.iter().map(hash_one).collect()
    }
}

/// A [`Comparator`] that reads inputs from the local filesystem.
///
/// With a `reference_root`, creatives are listed from
/// `<reference_root>/<reference_id>/`; without one every reference set is
/// empty.
pub fn local_comparator(
    perceptual: PerceptualConfig,
    config: CompareConfig,
    reference_root: Option<PathBuf>,
) -> Result<Comparator, CompareError> {
    let fetcher = Arc::new(LocalFileFetcher::new(&config));
    let references: Arc<dyn ReferenceLookup> = match reference_root {
        Some(root) => Arc::new(DirectoryReferenceLookup::new(root)),
        None => Arc::new(InMemoryReferenceLookup::new()),
    };
    Comparator::new(perceptual, config, fetcher, references)
}
