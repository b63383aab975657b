use perceptual::PerceptualError;
use std::io;
use thiserror::Error;

/// Failure to retrieve image bytes. Always recovered per image.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("fetch timed out after {0}s")]
    Timeout(u64),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("response is not an image (content-type {content_type:?})")]
    NotAnImage { content_type: String },

    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of the reference-asset collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("reference store io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed creatives manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("reference store unavailable: {0}")]
    Unavailable(String),
}

/// Request-level failures of [`crate::Comparator::compare_images`].
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("invalid request: {0}")]
    Validation(String),

    /// Two fingerprints disagree on algorithm or length. Not caused by input
    /// data.
    #[error("fingerprint invariant violated: {0}")]
    Fingerprint(#[from] PerceptualError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Why a single image ended up `failed`.
#[derive(Debug, Error)]
pub(crate) enum ImageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Decode(#[from] PerceptualError),

    #[error("hashing task failed: {0}")]
    Join(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_messages() {
        assert_eq!(
            FetchError::Status(404).to_string(),
            "upstream returned HTTP 404"
        );
        assert!(FetchError::NotAnImage {
            content_type: "text/html".into()
        }
        .to_string()
        .contains("text/html"));
    }

    #[test]
    fn perceptual_errors_convert() {
        let err: CompareError = PerceptualError::LengthMismatch {
            left: 64,
            right: 256,
        }
        .into();
        assert!(matches!(err, CompareError::Fingerprint(_)));
    }
}
