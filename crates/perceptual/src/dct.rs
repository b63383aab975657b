//! Separable DCT-II restricted to the low-frequency corner.
//!
//! Only the top-left `keep × keep` coefficients feed the pHash, so the
//! transform never materialises the full `n × n` spectrum. Scaling follows the
//! unnormalised DCT-II (`2 Σ x[i] cos(π k (2i + 1) / 2n)` per axis); the
//! median threshold is scale-invariant, so only consistency matters.

use std::f64::consts::PI;

/// Cosine basis table: `table[k * n + i] = cos(π k (2i + 1) / 2n)` for `k < keep`.
fn basis(n: usize, keep: usize) -> Vec<f64> {
    let mut table = Vec::with_capacity(keep * n);
    for k in 0..keep {
        for i in 0..n {
            table.push((PI * k as f64 * (2 * i + 1) as f64 / (2 * n) as f64).cos());
        }
    }
    table
}

/// Low-frequency DCT-II block of a square row-major `n × n` image.
///
/// Returns `keep × keep` coefficients, row-major, row index = vertical
/// frequency.
pub(crate) fn dct_lowfreq(pixels: &[f64], n: usize, keep: usize) -> Vec<f64> {
    debug_assert_eq!(pixels.len(), n * n);
    debug_assert!(keep <= n);

    let cos = basis(n, keep);

    // Columns first: partial[v][x] = 2 Σ_y p[y][x] cos_v(y)
    let mut partial = vec![0.0f64; keep * n];
    for v in 0..keep {
        let row = &cos[v * n..(v + 1) * n];
        for (y, weight) in row.iter().enumerate() {
            let line = &pixels[y * n..(y + 1) * n];
            let out = &mut partial[v * n..(v + 1) * n];
            for (acc, px) in out.iter_mut().zip(line) {
                *acc += px * weight;
            }
        }
    }

    // Then rows: coeff[v][u] = 2 Σ_x partial[v][x] cos_u(x)
    let mut coeffs = Vec::with_capacity(keep * keep);
    for v in 0..keep {
        let line = &partial[v * n..(v + 1) * n];
        for u in 0..keep {
            let row = &cos[u * n..(u + 1) * n];
            let sum: f64 = line.iter().zip(row).map(|(p, c)| p * c).sum();
            coeffs.push(4.0 * sum);
        }
    }
    coeffs
}

/// Median of a non-empty slice; the mean of the two middle values for even
/// lengths.
pub(crate) fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_image_has_only_dc_energy() {
        let n = 8;
        let pixels = vec![10.0; n * n];
        let coeffs = dct_lowfreq(&pixels, n, 4);
        assert_eq!(coeffs.len(), 16);
        // 4 * 10 * n * n
        assert!((coeffs[0] - 2560.0).abs() < 1e-9);
        for c in &coeffs[1..] {
            assert!(c.abs() < 1e-9, "unexpected AC energy {c}");
        }
    }

    #[test]
    fn horizontal_ramp_only_excites_first_row() {
        let n = 16;
        let pixels: Vec<f64> = (0..n * n).map(|i| (i % n) as f64).collect();
        let coeffs = dct_lowfreq(&pixels, n, 4);
        // vertical frequency > 0 rows carry nothing for a purely horizontal ramp
        for v in 1..4 {
            for u in 0..4 {
                assert!(coeffs[v * 4 + u].abs() < 1e-9);
            }
        }
        assert!(coeffs[1].abs() > 1.0);
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
