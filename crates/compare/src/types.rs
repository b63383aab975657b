//! Request and response shapes of one comparison pass.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CompareError;

/// Longest accepted reference id.
pub const MAX_REFERENCE_ID_LEN: usize = 128;

/// Images to fingerprint plus an optional reference set to compare against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    pub image_urls: Vec<String>,
    /// Campaign/analysis whose generated creatives act as comparison targets.
    /// Empty strings mean "no reference set".
    #[serde(default)]
    pub compare_with_reference_id: Option<String>,
}

impl ComparisonRequest {
    pub fn new<I, S>(image_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            image_urls: image_urls.into_iter().map(Into::into).collect(),
            compare_with_reference_id: None,
        }
    }

    pub fn with_reference(mut self, reference_id: impl Into<String>) -> Self {
        self.compare_with_reference_id = Some(reference_id.into());
        self
    }

    /// The reference id, if one was given and is not blank.
    pub fn reference_id(&self) -> Option<&str> {
        self.compare_with_reference_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Shape checks run before any fetching.
    pub fn validate(&self, max_images: usize) -> Result<(), CompareError> {
        if self.image_urls.len() > max_images {
            return Err(CompareError::Validation(format!(
                "at most {max_images} image_urls allowed, got {}",
                self.image_urls.len()
            )));
        }
        if let Some(id) = self.reference_id() {
            let well_formed = id.len() <= MAX_REFERENCE_ID_LEN
                && id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if !well_formed {
                return Err(CompareError::Validation(format!(
                    "compare_with_reference_id must match [A-Za-z0-9_-]{{1,{MAX_REFERENCE_ID_LEN}}}"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of fingerprinting one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    Ok,
    Failed,
}

/// One entry of the per-input status list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    /// Hex fingerprint, `null` when the image failed.
    pub fingerprint: Option<String>,
    pub status: ImageStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A previously generated creative used as a comparison target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceAsset {
    pub creative_id: String,
    /// Materialized raster file, if the creative has one.
    pub image_path: Option<PathBuf>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default = "default_version")]
    pub version: u32,
}

impl ReferenceAsset {
    pub fn new(creative_id: impl Into<String>, image_path: impl Into<PathBuf>) -> Self {
        Self {
            creative_id: creative_id.into(),
            image_path: Some(image_path.into()),
            provider: None,
            version: default_version(),
        }
    }

    /// A creative without a materialized image (text-only artifact).
    pub fn without_image(creative_id: impl Into<String>) -> Self {
        Self {
            creative_id: creative_id.into(),
            image_path: None,
            provider: None,
            version: default_version(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

fn default_version() -> u32 {
    1
}

/// Input image versus reference creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceComparison {
    pub image_url: String,
    pub creative_id: String,
    pub creative_provider: Option<String>,
    pub creative_version: u32,
    pub distance: u32,
    pub similarity_percent: f64,
    pub is_similar: bool,
}

/// Unordered pair of input images, `image_a` earlier in the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossComparison {
    pub image_a: String,
    pub image_b: String,
    pub distance: u32,
    pub similarity_percent: f64,
    pub is_similar: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_images: usize,
    pub hashed_successfully: usize,
    pub similar_to_reference: usize,
    pub similar_cross: usize,
}

/// Full response of one comparison pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub images: Vec<ImageResult>,
    pub reference_comparisons: Vec<ReferenceComparison>,
    pub cross_comparisons: Vec<CrossComparison>,
    pub summary: ComparisonSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_reference_id_is_absent() {
        let req = ComparisonRequest::new(["a"]).with_reference("  ");
        assert_eq!(req.reference_id(), None);
        let req = ComparisonRequest::new(["a"]).with_reference(" camp-1 ");
        assert_eq!(req.reference_id(), Some("camp-1"));
    }

    #[test]
    fn too_many_urls_rejected() {
        let req = ComparisonRequest::new((0..11).map(|i| format!("https://x/{i}.png")));
        assert!(matches!(
            req.validate(10),
            Err(CompareError::Validation(_))
        ));
        let req = ComparisonRequest::new((0..10).map(|i| format!("https://x/{i}.png")));
        assert!(req.validate(10).is_ok());
    }

    #[test]
    fn path_like_reference_ids_rejected() {
        for bad in ["../etc", "a/b", "a\\b", "x".repeat(129).as_str()] {
            let req = ComparisonRequest::new(Vec::<String>::new()).with_reference(bad);
            assert!(req.validate(10).is_err(), "{bad} accepted");
        }
        let req = ComparisonRequest::new(Vec::<String>::new()).with_reference("Camp_2024-01");
        assert!(req.validate(10).is_ok());
    }

    #[test]
    fn request_deserializes_without_reference() {
        let req: ComparisonRequest =
            serde_json::from_str(r#"{"image_urls": ["https://a/b.png"]}"#).unwrap();
        assert_eq!(req.image_urls.len(), 1);
        assert_eq!(req.reference_id(), None);
    }

    #[test]
    fn status_serializes_lowercase() {
        let result = ImageResult {
            url: "u".into(),
            fingerprint: None,
            status: ImageStatus::Failed,
            error: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json["fingerprint"].is_null());
        assert!(json.get("error").is_none());
    }
}
