#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

/// Smooth, structured greyscale pattern; `phase` shifts it horizontally.
pub fn waves(phase: f64) -> GrayImage {
    GrayImage::from_fn(96, 96, |x, y| {
        let (fx, fy) = (f64::from(x), f64::from(y));
        let v = 128.0
            + 60.0 * ((fx + phase) / 9.0).sin()
            + 50.0 * (fy / 13.0).cos()
            + 30.0 * ((fx + 2.0 * fy) / 11.0).sin();
        Luma([v.clamp(0.0, 255.0) as u8])
    })
}

pub fn encode(img: &GrayImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img.clone())
        .write_to(&mut out, format)
        .expect("encode test image");
    out.into_inner()
}

pub fn write_png(path: &Path, img: &GrayImage) {
    std::fs::write(path, encode(img, ImageFormat::Png)).expect("write test image");
}
