//! Image decoding and the three hash constructions.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageError};
use rayon::prelude::*;

use crate::config::{PerceptualConfig, PerceptualError};
use crate::dct::{dct_lowfreq, median};
use crate::fingerprint::{HashAlgorithm, ImageFingerprint};

/// Decode raw bytes (format sniffed from the magic number) and fingerprint
/// them.
pub fn fingerprint_bytes(
    bytes: &[u8],
    cfg: &PerceptualConfig,
) -> Result<ImageFingerprint, PerceptualError> {
    cfg.validate()?;
    let image = decode(bytes)?;
    fingerprint_decoded(&image, cfg)
}

/// Fingerprint an already decoded image.
pub fn fingerprint_image(
    image: &DynamicImage,
    cfg: &PerceptualConfig,
) -> Result<ImageFingerprint, PerceptualError> {
    cfg.validate()?;
    fingerprint_decoded(image, cfg)
}

/// Fingerprint many encoded images; results keep input order.
pub fn fingerprint_batch<B>(
    images: &[B],
    cfg: &PerceptualConfig,
) -> Vec<Result<ImageFingerprint, PerceptualError>>
where
    B: AsRef<[u8]> + Sync,
{
    if cfg.use_parallel {
        images
            .par_iter()
            .map(|bytes| fingerprint_bytes(bytes.as_ref(), cfg))
            .collect()
    } else {
        images
            .iter()
            .map(|bytes| fingerprint_bytes(bytes.as_ref(), cfg))
            .collect()
    }
}

fn decode(bytes: &[u8]) -> Result<DynamicImage, PerceptualError> {
    let format = image::guess_format(bytes).map_err(|_| PerceptualError::UnsupportedFormat)?;
    image::load_from_memory_with_format(bytes, format).map_err(|err| match err {
        ImageError::Unsupported(_) => PerceptualError::UnsupportedFormat,
        other => PerceptualError::Decode(other.to_string()),
    })
}

fn fingerprint_decoded(
    image: &DynamicImage,
    cfg: &PerceptualConfig,
) -> Result<ImageFingerprint, PerceptualError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PerceptualError::Decode("image has no pixels".into()));
    }
    let gray = image.to_luma8();
    let bits = match cfg.algorithm {
        HashAlgorithm::PHash => phash_bits(&gray, cfg.hash_size, cfg.highfreq_factor),
        HashAlgorithm::DHash => dhash_bits(&gray, cfg.hash_size),
        HashAlgorithm::AHash => ahash_bits(&gray, cfg.hash_size),
    };
    Ok(ImageFingerprint::from_bits(cfg.algorithm, bits))
}

fn shrink(gray: &GrayImage, width: u32, height: u32) -> Vec<f64> {
    imageops::resize(gray, width, height, FilterType::Lanczos3)
        .pixels()
        .map(|p| f64::from(p.0[0]))
        .collect()
}

fn phash_bits(gray: &GrayImage, hash_size: u32, highfreq_factor: u32) -> Vec<bool> {
    let side = hash_size * highfreq_factor;
    let pixels = shrink(gray, side, side);
    let coeffs = dct_lowfreq(&pixels, side as usize, hash_size as usize);
    let med = median(&coeffs);
    coeffs.iter().map(|c| *c > med).collect()
}

fn dhash_bits(gray: &GrayImage, hash_size: u32) -> Vec<bool> {
    let width = (hash_size + 1) as usize;
    let pixels = shrink(gray, hash_size + 1, hash_size);
    let mut bits = Vec::with_capacity((hash_size * hash_size) as usize);
    for row in pixels.chunks_exact(width) {
        bits.extend(row.windows(2).map(|pair| pair[1] > pair[0]));
    }
    bits
}

fn ahash_bits(gray: &GrayImage, hash_size: u32) -> Vec<bool> {
    let pixels = shrink(gray, hash_size, hash_size);
    let mean = pixels.iter().sum::<f64>() / pixels.len() as f64;
    pixels.iter().map(|p| *p > mean).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::hamming_distance;
    use image::{ImageFormat, Luma};
    use std::io::Cursor;

    fn pattern(size: u32) -> GrayImage {
        let scale = 256.0 / f64::from(size);
        GrayImage::from_fn(size, size, |x, y| {
            let (fx, fy) = (f64::from(x) * scale, f64::from(y) * scale);
            let v = 128.0
                + 50.0 * (fx / 19.0).sin()
                + 40.0 * (fy / 29.0).cos()
                + 30.0 * ((fx + 2.0 * fy) / 23.0).sin();
            Luma([v.clamp(0.0, 255.0) as u8])
        })
    }

    fn png(image: &GrayImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image.clone())
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn same_bytes_same_fingerprint() {
        let bytes = png(&pattern(128));
        let cfg = PerceptualConfig::default();
        let a = fingerprint_bytes(&bytes, &cfg).unwrap();
        let b = fingerprint_bytes(&bytes, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bit_len(), 64);
        assert_eq!(a.to_hex().len(), 16);
    }

    #[test]
    fn resized_copy_stays_close() {
        let cfg = PerceptualConfig::default();
        let original = fingerprint_bytes(&png(&pattern(256)), &cfg).unwrap();
        let smaller = fingerprint_bytes(&png(&pattern(128)), &cfg).unwrap();
        let distance = hamming_distance(&original, &smaller).unwrap();
        assert!(distance < cfg.similarity_threshold, "distance {distance}");
    }

    #[test]
    fn inverted_image_is_far() {
        let cfg = PerceptualConfig::default();
        let base = pattern(128);
        let mut inverted = base.clone();
        imageops::invert(&mut inverted);
        let a = fingerprint_bytes(&png(&base), &cfg).unwrap();
        let b = fingerprint_bytes(&png(&inverted), &cfg).unwrap();
        assert!(hamming_distance(&a, &b).unwrap() > cfg.similarity_threshold);
    }

    #[test]
    fn every_algorithm_yields_configured_length() {
        let bytes = png(&pattern(64));
        for algorithm in [HashAlgorithm::PHash, HashAlgorithm::DHash, HashAlgorithm::AHash] {
            for hash_size in [4, 8, 16] {
                let cfg = PerceptualConfig::new()
                    .with_algorithm(algorithm)
                    .with_hash_size(hash_size);
                let fp = fingerprint_bytes(&bytes, &cfg).unwrap();
                assert_eq!(fp.algorithm(), algorithm);
                assert_eq!(fp.bit_len(), hash_size * hash_size);
            }
        }
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let cfg = PerceptualConfig::default();
        assert_eq!(
            fingerprint_bytes(b"<html>not an image</html>", &cfg),
            Err(PerceptualError::UnsupportedFormat)
        );

        let mut truncated = png(&pattern(64));
        truncated.truncate(40);
        assert!(matches!(
            fingerprint_bytes(&truncated, &cfg),
            Err(PerceptualError::Decode(_))
        ));
    }

    #[test]
    fn invalid_config_is_reported_before_decoding() {
        let cfg = PerceptualConfig::new().with_hash_size(5);
        assert_eq!(
            fingerprint_bytes(b"", &cfg),
            Err(PerceptualError::InvalidHashSize { hash_size: 5 })
        );
    }

    #[test]
    fn batch_preserves_order_in_parallel() {
        let good = png(&pattern(64));
        let inputs: Vec<Vec<u8>> = vec![good.clone(), b"nope".to_vec(), good];
        let sequential = fingerprint_batch(&inputs, &PerceptualConfig::default());
        let parallel = fingerprint_batch(&inputs, &PerceptualConfig::new().with_parallel(true));
        assert_eq!(sequential, parallel);
        assert!(parallel[0].is_ok());
        assert!(parallel[1].is_err());
        assert_eq!(parallel[0], parallel[2]);
    }

    #[test]
    fn flat_image_hashes_without_panicking() {
        let flat = GrayImage::from_pixel(10, 10, Luma([200]));
        let cfg = PerceptualConfig::default();
        let fp = fingerprint_image(&DynamicImage::ImageLuma8(flat), &cfg).unwrap();
        assert_eq!(fp.bit_len(), 64);
    }
}
