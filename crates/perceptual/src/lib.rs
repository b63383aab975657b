//! # adfp Perceptual Fingerprinting
//!
//! This crate turns raw image bytes into compact, similarity-preserving
//! fingerprints and scores pairs of fingerprints by Hamming distance. It is
//! the pure core of the creative comparison service: no I/O, no network, no
//! clocks, no global state.
//!
//! ## Contract
//!
//! - A fingerprint is a pure function of `(image_bytes, config)`: hashing the
//!   same bytes twice yields the identical fingerprint.
//! - Small visual changes (resize, mild recompression, minor crops) move a
//!   fingerprint by few bits. Byte equality of inputs is not required.
//! - Fingerprints are only comparable when produced by the same
//!   [`HashAlgorithm`] and bit length; [`hamming_distance`] checks both.
//!
//! ## Pipeline
//!
//! 1.  **Decode**: the format is sniffed from the magic number and decoded
//!     with the `image` crate (PNG, JPEG, WebP, GIF).
//! 2.  **Reduce**: greyscale, then Lanczos downsampling to a small square.
//! 3.  **Hash**: for pHash, a DCT-II over the reduced image; the top-left
//!     `hash_size × hash_size` low-frequency block is thresholded against its
//!     median. dHash and aHash threshold gradients or the mean instead.
//! 4.  **Score**: Hamming distance, similarity percentage
//!     `max(0, 100 - d * 100 / bits)` and the `d < threshold` flag.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{compare_fingerprints, HashAlgorithm, ImageFingerprint};
//!
//! let a = ImageFingerprint::from_hex(HashAlgorithm::PHash, "c3d1e0f0f8783c1e").unwrap();
//! let b = ImageFingerprint::from_hex(HashAlgorithm::PHash, "c3d1e0f0f8783c1f").unwrap();
//!
//! let sim = compare_fingerprints(&a, &b, perceptual::DEFAULT_SIMILARITY_THRESHOLD).unwrap();
//! assert_eq!(sim.distance, 1);
//! assert!(sim.is_similar);
//! ```
pub mod config;
mod dct;
pub mod distance;
pub mod fingerprint;
mod hash;

pub use crate::config::{
    PerceptualConfig, PerceptualError, DEFAULT_SIMILARITY_THRESHOLD, MAX_HASH_SIZE, MIN_HASH_SIZE,
};
pub use crate::distance::{
    compare_fingerprints, hamming_distance, is_similar, similarity_percent, Similarity,
};
pub use crate::fingerprint::{HashAlgorithm, ImageFingerprint};
pub use crate::hash::{fingerprint_batch, fingerprint_bytes, fingerprint_image};

/// Current perceptual algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;
