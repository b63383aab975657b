mod common;

use adfp::{HashAlgorithm, PerceptualConfig, fingerprint_bytes, fingerprint_files};
use image::ImageFormat;

#[test]
fn same_bytes_give_same_fingerprint_for_every_algorithm() {
    let png = common::encode(&common::waves(0.0), ImageFormat::Png);

    for algorithm in [HashAlgorithm::PHash, HashAlgorithm::DHash, HashAlgorithm::AHash] {
        let cfg = PerceptualConfig::default().with_algorithm(algorithm);
        let a = fingerprint_bytes(&png, &cfg).expect("first fingerprint");
        let b = fingerprint_bytes(&png, &cfg).expect("second fingerprint");
        assert_eq!(a, b, "{algorithm} must be deterministic");
        assert_eq!(a.to_hex(), b.to_hex());
    }
}

#[test]
fn parallel_and_sequential_file_hashing_agree() {
    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<_> = (0..6)
        .map(|i| {
            let path = dir.path().join(format!("img-{i}.png"));
            common::write_png(&path, &common::waves(f64::from(i) * 7.0));
            path
        })
        .collect();

    let sequential = fingerprint_files(paths.as_slice(), &PerceptualConfig::default());
    let parallel = fingerprint_files(paths.as_slice(), &PerceptualConfig::default().with_parallel(true));

    let seq: Vec<_> = sequential.into_iter().map(|r| r.unwrap()).collect();
    let par: Vec<_> = parallel.into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(seq, par);
}

