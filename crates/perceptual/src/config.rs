//! Configuration and error types for adfp perceptual fingerprinting.
//!
//! This module defines the public configuration surface for the hashing
//! layer. It is free of any I/O or environment-dependent behavior so that a
//! fingerprint is a pure function of `(image_bytes, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::HashAlgorithm;

/// Distance below which two fingerprints are reported as similar.
///
/// Policy constant: for a 64-bit fingerprint this is roughly 23% of bits
/// differing. Tune it through [`PerceptualConfig::similarity_threshold`].
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 15;

/// Smallest and largest supported `hash_size` (side of the bit grid).
pub const MIN_HASH_SIZE: u32 = 4;
pub const MAX_HASH_SIZE: u32 = 16;

/// Configuration for the perceptual hashing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version, so that stored fingerprints remain comparable.
    pub version: u32,
    /// Hash construction used for every image.
    pub algorithm: HashAlgorithm,
    /// Side length of the bit grid; the fingerprint holds `hash_size²` bits.
    ///
    /// Must be even so the hex form has a whole number of nibbles.
    pub hash_size: u32,
    /// pHash oversampling: the image is reduced to
    /// `hash_size * highfreq_factor` pixels per side before the DCT.
    pub highfreq_factor: u32,
    /// Hamming distance strictly below which a pair is flagged similar.
    pub similarity_threshold: u32,
    /// Fingerprint batches on the rayon pool.
    pub use_parallel: bool,
}

impl PerceptualConfig {
    /// Create a new configuration with the 64-bit pHash defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the bit grid side. 8 gives 64-bit fingerprints, 16 gives 256.
    pub fn with_hash_size(mut self, hash_size: u32) -> Self {
        self.hash_size = hash_size;
        self
    }

    pub fn with_highfreq_factor(mut self, factor: u32) -> Self {
        self.highfreq_factor = factor;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: u32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    /// Number of bits in fingerprints produced under this configuration.
    pub fn bit_len(&self) -> u32 {
        self.hash_size * self.hash_size
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if !(MIN_HASH_SIZE..=MAX_HASH_SIZE).contains(&self.hash_size) || self.hash_size % 2 != 0
        {
            return Err(PerceptualError::InvalidHashSize {
                hash_size: self.hash_size,
            });
        }
        if !(1..=8).contains(&self.highfreq_factor) {
            return Err(PerceptualError::InvalidHighfreqFactor {
                factor: self.highfreq_factor,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            algorithm: HashAlgorithm::PHash,
            hash_size: 8,
            highfreq_factor: 4,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            use_parallel: false,
        }
    }
}

/// Errors returned by the perceptual hashing layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("unsupported or unrecognised image format")]
    UnsupportedFormat,

    #[error("fingerprint length mismatch: {left} bits vs {right} bits")]
    LengthMismatch { left: u32, right: u32 },

    #[error("fingerprint algorithm mismatch: {left} vs {right}")]
    AlgorithmMismatch {
        left: HashAlgorithm,
        right: HashAlgorithm,
    },

    #[error("invalid fingerprint hex: {0}")]
    InvalidHex(String),

    #[error("invalid config: hash_size must be even and within 4..=16 (got {hash_size})")]
    InvalidHashSize { hash_size: u32 },

    #[error("invalid config: highfreq_factor must be within 1..=8 (got {factor})")]
    InvalidHighfreqFactor { factor: u32 },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = PerceptualConfig::default();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.algorithm, HashAlgorithm::PHash);
        assert_eq!(cfg.hash_size, 8);
        assert_eq!(cfg.highfreq_factor, 4);
        assert_eq!(cfg.similarity_threshold, 15);
        assert_eq!(cfg.bit_len(), 64);
        assert!(!cfg.use_parallel);
    }

    #[test]
    fn config_builder_chain() {
        let cfg = PerceptualConfig::new()
            .with_algorithm(HashAlgorithm::DHash)
            .with_hash_size(16)
            .with_highfreq_factor(2)
            .with_similarity_threshold(40)
            .with_parallel(true);

        assert_eq!(cfg.algorithm, HashAlgorithm::DHash);
        assert_eq!(cfg.bit_len(), 256);
        assert_eq!(cfg.highfreq_factor, 2);
        assert_eq!(cfg.similarity_threshold, 40);
        assert!(cfg.use_parallel);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validate_rejects_odd_hash_size() {
        let cfg = PerceptualConfig::new().with_hash_size(7);
        assert_eq!(
            cfg.validate(),
            Err(PerceptualError::InvalidHashSize { hash_size: 7 })
        );
    }

    #[test]
    fn config_validate_rejects_out_of_range() {
        assert!(PerceptualConfig::new().with_hash_size(2).validate().is_err());
        assert!(PerceptualConfig::new().with_hash_size(18).validate().is_err());
        assert_eq!(
            PerceptualConfig::new().with_highfreq_factor(0).validate(),
            Err(PerceptualError::InvalidHighfreqFactor { factor: 0 })
        );
        let cfg = PerceptualConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PerceptualError::InvalidConfigVersion { version: 0 })
        ));
    }

    #[test]
    fn config_deserializes_partial_documents() {
        let cfg: PerceptualConfig =
            serde_json::from_str(r#"{"algorithm":"ahash","similarity_threshold":10}"#).unwrap();
        assert_eq!(cfg.algorithm, HashAlgorithm::AHash);
        assert_eq!(cfg.similarity_threshold, 10);
        assert_eq!(cfg.hash_size, 8);
    }

    #[test]
    fn error_display_length_mismatch() {
        let err = PerceptualError::LengthMismatch {
            left: 64,
            right: 256,
        };
        assert!(err.to_string().contains("64 bits vs 256 bits"));
    }
}
