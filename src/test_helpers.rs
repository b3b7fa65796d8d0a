//! Shared test utilities for the summit-upload test suite.
//!
//! Fixtures are synthesised on the fly into temp directories, so tests never
//! depend on files checked into the repo.

use image::{GrayAlphaImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a PNG with a transparent left half.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, alpha])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a greyscale PNG with alpha: a horizontal ramp, top rows transparent.
pub fn create_test_png_gray_alpha(path: &Path, width: u32, height: u32) {
    let img = GrayAlphaImage::from_fn(width, height, |x, y| {
        let alpha = if y < height / 4 { 0 } else { 255 };
        LumaA([(x * 255 / width.max(1)) as u8, alpha])
    });
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

// =========================================================================
// Manifest fixtures
// =========================================================================

/// Write `summit.yaml` into `dir` with one entry per `(url, preview_url)`.
///
/// Each entry also carries a `caption`, which the loader must ignore.
pub fn write_manifest(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let mut yaml = String::from("name: Test Summit\nimages:\n");
    for (i, (url, preview_url)) in entries.iter().enumerate() {
        yaml.push_str(&format!(
            "  - url: {url}\n    preview_url: {preview_url}\n    caption: photo {i}\n"
        ));
    }
    let path = dir.join("summit.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}
