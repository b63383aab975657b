//! Fingerprint types for the adfp perceptual layer.
//!
//! The textual form of a fingerprint is part of the public contract: lowercase
//! hex, first bit in the most significant position of the first nibble. Any
//! incompatible change to the bit layout must bump the config `version`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PerceptualError;

/// Hash construction that produced a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// DCT low-frequency block thresholded against its median.
    #[default]
    PHash,
    /// Sign of the horizontal gradient between neighbouring pixels.
    DHash,
    /// Pixels thresholded against the mean intensity.
    AHash,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::PHash => "phash",
            HashAlgorithm::DHash => "dhash",
            HashAlgorithm::AHash => "ahash",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phash" => Ok(HashAlgorithm::PHash),
            "dhash" => Ok(HashAlgorithm::DHash),
            "ahash" => Ok(HashAlgorithm::AHash),
            other => Err(format!("unknown hash algorithm '{other}'")),
        }
    }
}

/// Fixed-length perceptual fingerprint of one decoded image.
///
/// Bits are packed most significant first into `u64` words; unused trailing
/// bits of the last word are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "FingerprintRepr", try_from = "FingerprintRepr")]
pub struct ImageFingerprint {
    algorithm: HashAlgorithm,
    bit_len: u32,
    words: Vec<u64>,
}

impl ImageFingerprint {
    /// Pack an ordered bit sequence. Callers guarantee a non-empty sequence
    /// whose length is a multiple of four.
    pub(crate) fn from_bits<I>(algorithm: HashAlgorithm, bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut words = Vec::new();
        let mut bit_len = 0u32;
        for bit in bits {
            let offset = (bit_len % 64) as usize;
            if offset == 0 {
                words.push(0);
            }
            if bit {
                if let Some(word) = words.last_mut() {
                    *word |= 1u64 << (63 - offset);
                }
            }
            bit_len += 1;
        }
        Self {
            algorithm,
            bit_len,
            words,
        }
    }

    /// Wrap a raw 64-bit value, e.g. one read back from storage.
    pub fn from_u64(algorithm: HashAlgorithm, value: u64) -> Self {
        Self {
            algorithm,
            bit_len: 64,
            words: vec![value],
        }
    }

    /// Parse the hex form produced by [`ImageFingerprint::to_hex`].
    ///
    /// The bit length is four times the number of hex digits.
    pub fn from_hex(algorithm: HashAlgorithm, hex: &str) -> Result<Self, PerceptualError> {
        let hex = hex.trim();
        if hex.is_empty() {
            return Err(PerceptualError::InvalidHex("empty string".into()));
        }
        let mut nibbles = Vec::with_capacity(hex.len());
        for ch in hex.chars() {
            let nibble = ch
                .to_digit(16)
                .ok_or_else(|| PerceptualError::InvalidHex(format!("non-hex character {ch:?}")))?;
            nibbles.push(nibble as u8);
        }
        let bits = nibbles
            .into_iter()
            .flat_map(|nibble| (0..4).rev().map(move |shift| (nibble >> shift) & 1 == 1));
        Ok(Self::from_bits(algorithm, bits))
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Number of meaningful bits.
    pub fn bit_len(&self) -> u32 {
        self.bit_len
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    /// The raw value of a 64-bit fingerprint.
    pub fn as_u64(&self) -> Option<u64> {
        (self.bit_len == 64).then(|| self.words[0])
    }

    /// Lowercase hex, one digit per four bits.
    pub fn to_hex(&self) -> String {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let nibble_count = self.bit_len.div_ceil(4) as usize;
        let mut out = String::with_capacity(nibble_count);
        for n in 0..nibble_count {
            let bit = n * 4;
            let word = self.words[bit / 64];
            let shift = 60 - (bit % 64);
            out.push(DIGITS[((word >> shift) & 0xF) as usize] as char);
        }
        out
    }
}

impl fmt::Display for ImageFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Serialize, Deserialize)]
struct FingerprintRepr {
    algorithm: HashAlgorithm,
    hex: String,
}

impl From<ImageFingerprint> for FingerprintRepr {
    fn from(value: ImageFingerprint) -> Self {
        Self {
            hex: value.to_hex(),
            algorithm: value.algorithm,
        }
    }
}

impl TryFrom<FingerprintRepr> for ImageFingerprint {
    type Error = PerceptualError;

    fn try_from(value: FingerprintRepr) -> Result<Self, Self::Error> {
        ImageFingerprint::from_hex(value.algorithm, &value.hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bit_is_most_significant() {
        let mut bits = vec![false; 64];
        bits[0] = true;
        bits[63] = true;
        let fp = ImageFingerprint::from_bits(HashAlgorithm::PHash, bits);
        assert_eq!(fp.bit_len(), 64);
        assert_eq!(fp.as_u64(), Some(0x8000_0000_0000_0001));
        assert_eq!(fp.to_hex(), "8000000000000001");
    }

    #[test]
    fn hex_matches_u64_formatting() {
        let fp = ImageFingerprint::from_u64(HashAlgorithm::PHash, 0x00ff_1234_abcd_0f0f);
        assert_eq!(fp.to_hex(), format!("{:016x}", 0x00ff_1234_abcd_0f0fu64));
        let parsed = ImageFingerprint::from_hex(HashAlgorithm::PHash, &fp.to_hex()).unwrap();
        assert_eq!(parsed, fp);
    }

    #[test]
    fn wide_fingerprints_span_words() {
        let hex = "f".repeat(32) + &"0".repeat(31) + "1";
        let fp = ImageFingerprint::from_hex(HashAlgorithm::DHash, &hex).unwrap();
        assert_eq!(fp.bit_len(), 256);
        assert_eq!(fp.words().len(), 4);
        assert_eq!(fp.as_u64(), None);
        assert_eq!(fp.to_hex(), hex);
    }

    #[test]
    fn from_hex_accepts_uppercase_and_rejects_garbage() {
        let fp = ImageFingerprint::from_hex(HashAlgorithm::PHash, "ABCDEF0123456789").unwrap();
        assert_eq!(fp.to_hex(), "abcdef0123456789");

        assert!(matches!(
            ImageFingerprint::from_hex(HashAlgorithm::PHash, "xyz"),
            Err(PerceptualError::InvalidHex(_))
        ));
        assert!(matches!(
            ImageFingerprint::from_hex(HashAlgorithm::PHash, "  "),
            Err(PerceptualError::InvalidHex(_))
        ));
    }

    #[test]
    fn serde_uses_algorithm_and_hex() {
        let fp = ImageFingerprint::from_u64(HashAlgorithm::AHash, 42);
        let json = serde_json::to_value(&fp).unwrap();
        assert_eq!(json["algorithm"], "ahash");
        assert_eq!(json["hex"], "000000000000002a");
        let back: ImageFingerprint = serde_json::from_value(json).unwrap();
        assert_eq!(back, fp);
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("PHash".parse::<HashAlgorithm>(), Ok(HashAlgorithm::PHash));
        assert_eq!("dhash".parse::<HashAlgorithm>(), Ok(HashAlgorithm::DHash));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
