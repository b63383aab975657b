//! Hamming distance and similarity scoring between fingerprints.

use serde::{Deserialize, Serialize};

use crate::config::PerceptualError;
use crate::fingerprint::ImageFingerprint;

/// Distance, derived percentage and threshold flag for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    pub distance: u32,
    pub similarity_percent: f64,
    pub is_similar: bool,
}

/// Count of differing bits.
///
/// Fingerprints from different algorithms or bit lengths are not comparable;
/// hitting either error means two code paths disagree on the hash
/// configuration.
pub fn hamming_distance(
    a: &ImageFingerprint,
    b: &ImageFingerprint,
) -> Result<u32, PerceptualError> {
    if a.bit_len() != b.bit_len() {
        return Err(PerceptualError::LengthMismatch {
            left: a.bit_len(),
            right: b.bit_len(),
        });
    }
    if a.algorithm() != b.algorithm() {
        return Err(PerceptualError::AlgorithmMismatch {
            left: a.algorithm(),
            right: b.algorithm(),
        });
    }
    Ok(a.words()
        .iter()
        .zip(b.words())
        .map(|(x, y)| (x ^ y).count_ones())
        .sum())
}

/// `max(0, 100 - distance * 100 / bit_len)`, rounded to one decimal place
/// with ties going to the even digit (81.25 -> 81.2).
pub fn similarity_percent(distance: u32, bit_len: u32) -> f64 {
    if bit_len == 0 {
        return 0.0;
    }
    let raw = 100.0 - f64::from(distance) * 100.0 / f64::from(bit_len);
    (raw.clamp(0.0, 100.0) * 10.0).round_ties_even() / 10.0
}

/// Threshold policy: strictly below `threshold` counts as similar.
#[inline]
pub fn is_similar(distance: u32, threshold: u32) -> bool {
    distance < threshold
}

pub fn compare_fingerprints(
    a: &ImageFingerprint,
    b: &ImageFingerprint,
    threshold: u32,
) -> Result<Similarity, PerceptualError> {
    let distance = hamming_distance(a, b)?;
    Ok(Similarity {
        distance,
        similarity_percent: similarity_percent(distance, a.bit_len()),
        is_similar: is_similar(distance, threshold),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SIMILARITY_THRESHOLD;
    use crate::fingerprint::HashAlgorithm;

    fn fp(value: u64) -> ImageFingerprint {
        ImageFingerprint::from_u64(HashAlgorithm::PHash, value)
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let a = fp(0xdead_beef_0000_ffff);
        let b = fp(0x1234_5678_9abc_def0);
        assert_eq!(hamming_distance(&a, &a).unwrap(), 0);
        assert_eq!(
            hamming_distance(&a, &b).unwrap(),
            hamming_distance(&b, &a).unwrap()
        );
        assert_eq!(
            hamming_distance(&a, &b).unwrap(),
            (0xdead_beef_0000_ffffu64 ^ 0x1234_5678_9abc_def0u64).count_ones()
        );
    }

    #[test]
    fn distance_counts_across_words() {
        let a = ImageFingerprint::from_hex(HashAlgorithm::PHash, &"0".repeat(64)).unwrap();
        let b = ImageFingerprint::from_hex(HashAlgorithm::PHash, &"f".repeat(64)).unwrap();
        assert_eq!(hamming_distance(&a, &b).unwrap(), 256);
        assert_eq!(similarity_percent(256, 256), 0.0);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let short = fp(0);
        let long = ImageFingerprint::from_hex(HashAlgorithm::PHash, &"0".repeat(64)).unwrap();
        assert_eq!(
            hamming_distance(&short, &long),
            Err(PerceptualError::LengthMismatch {
                left: 64,
                right: 256
            })
        );
    }

    #[test]
    fn mismatched_algorithms_are_rejected() {
        let p = fp(0);
        let d = ImageFingerprint::from_u64(HashAlgorithm::DHash, 0);
        assert!(matches!(
            hamming_distance(&p, &d),
            Err(PerceptualError::AlgorithmMismatch { .. })
        ));
    }

    #[test]
    fn similarity_values_for_64_bits() {
        assert_eq!(similarity_percent(0, 64), 100.0);
        assert_eq!(similarity_percent(1, 64), 98.4);
        assert_eq!(similarity_percent(14, 64), 78.1);
        assert_eq!(similarity_percent(15, 64), 76.6);
        assert_eq!(similarity_percent(32, 64), 50.0);
        assert_eq!(similarity_percent(64, 64), 0.0);
        assert_eq!(similarity_percent(80, 64), 0.0);
    }

    #[test]
    fn similarity_ties_round_to_even() {
        for (d, expected) in [(12, 81.2), (28, 56.2), (44, 31.2), (60, 6.2)] {
            assert_eq!(similarity_percent(d, 64), expected, "d={d}");
        }
        // 93.75 -> 93.8, the even neighbour is above
        assert_eq!(similarity_percent(4, 64), 93.8);
    }

    #[test]
    fn similarity_is_non_increasing_and_bounded() {
        let mut previous = f64::INFINITY;
        for d in 0..=64 {
            let s = similarity_percent(d, 64);
            assert!((0.0..=100.0).contains(&s));
            assert!(s <= previous, "similarity rose at d={d}");
            previous = s;
        }
    }

    #[test]
    fn threshold_boundary() {
        assert!(is_similar(14, DEFAULT_SIMILARITY_THRESHOLD));
        assert!(!is_similar(15, DEFAULT_SIMILARITY_THRESHOLD));
        assert!(is_similar(0, DEFAULT_SIMILARITY_THRESHOLD));
    }

    #[test]
    fn compare_bundles_all_fields() {
        let a = fp(0);
        let b = fp(0b111);
        let sim = compare_fingerprints(&a, &b, DEFAULT_SIMILARITY_THRESHOLD).unwrap();
        assert_eq!(sim.distance, 3);
        assert_eq!(sim.similarity_percent, 95.3);
        assert!(sim.is_similar);
    }
}
