//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary; no ImageMagick, no libjpeg.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Flatten | `DynamicImage::to_rgb8` (alpha dropped, not composited) |
//! | Encode → JPEG | `jpeg_encoder::Encoder` with optimized Huffman tables, into a `Vec<u8>` |
//!
//! ## Transparency
//!
//! JPEG has no alpha channel. Transparent or palette images are converted to
//! RGB by discarding alpha: the colour stored under a fully transparent pixel
//! is what ends up in the output. No background colour is blended in, so the
//! result is lossy but deterministic.

use super::backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
use super::params::{Quality, RenderParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};
use std::fs::File;
use jpeg_encoder::{ColorType as JpegColor, Encoder};
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a source file with its format guessed from the leading bytes.
fn open_source(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    if !path.is_file() {
        return Err(BackendError::SourceNotFound(path.to_path_buf()));
    }
    let reader = ImageReader::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BackendError::SourceNotFound(path.to_path_buf()),
        _ => BackendError::Io(e),
    })?;
    Ok(reader.with_guessed_format()?)
}

/// Load and decode an image from disk.
///
/// The file handle lives only as long as the reader; it is closed before
/// this function returns.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_source(path)?
        .decode()
        .map_err(|e| BackendError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Convert any colour mode (RGBA, palette, grey, 16-bit) to 8-bit RGB.
fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    match img {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}

/// Encode an RGB image as JPEG into memory with optimized Huffman tables.
fn encode_jpeg(img: &RgbImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    encode_jpeg_with(img, quality, true)
}

fn encode_jpeg_with(
    img: &RgbImage,
    quality: Quality,
    optimize: bool,
) -> Result<Vec<u8>, BackendError> {
    let (width, height) = img.dimensions();
    let too_large =
        || BackendError::Encode(format!("{width}x{height} exceeds the 65535px JPEG limit"));
    let jpeg_width = u16::try_from(width).map_err(|_| too_large())?;
    let jpeg_height = u16::try_from(height).map_err(|_| too_large())?;

    let mut bytes = Vec::new();
    let mut encoder = Encoder::new(&mut bytes, quality.as_u8());
    encoder.set_optimized_huffman_tables(optimize);
    encoder
        .encode(img.as_raw(), jpeg_width, jpeg_height, JpegColor::Rgb)
        .map_err(|e| BackendError::Encode(e.to_string()))?;
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_source(path)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn render_jpeg(&self, params: &RenderParams) -> Result<EncodedImage, BackendError> {
        let img = load_image(&params.source)?;
        debug!(
            source = %params.source.display(),
            original_width = img.width(),
            original_height = img.height(),
            color = ?img.color(),
            "decoded source image"
        );

        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        drop(img);

        let rgb = flatten_to_rgb(resized);
        let (width, height) = rgb.dimensions();
        let bytes = encode_jpeg(&rgb, params.quality)?;
        drop(rgb);
        debug!(width, height, bytes = bytes.len(), "encoded JPEG variant");

        Ok(EncodedImage {
            bytes,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Quality;
    use crate::test_helpers::{create_test_jpeg, create_test_png_gray_alpha, create_test_png_rgba};
    use image::{ColorType, ImageFormat};

    fn render(source: &Path, width: u32, height: u32) -> Result<EncodedImage, BackendError> {
        RustBackend::new().render_jpeg(&RenderParams {
            source: source.to_path_buf(),
            width,
            height,
            quality: Quality::new(85),
        })
    }

    fn decode_output(encoded: &EncodedImage) -> DynamicImage {
        image::load_from_memory_with_format(&encoded.bytes, ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("summit.jpg");
        create_test_jpeg(&source, 320, 180);

        let dims = RustBackend::new().identify(&source).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 320,
                height: 180
            }
        );
    }

    #[test]
    fn identify_sniffs_format_from_content() {
        let tmp = tempfile::TempDir::new().unwrap();
        // PNG bytes behind a .jpg name
        let source = tmp.path().join("mislabelled.jpg");
        create_test_png_rgba(&source, 40, 30);

        let dims = RustBackend::new().identify(&source).unwrap();
        assert_eq!((dims.width, dims.height), (40, 30));
    }

    #[test]
    fn render_downscale_exact_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("summit.jpg");
        create_test_jpeg(&source, 400, 300);

        let encoded = render(&source, 200, 150).unwrap();
        assert_eq!((encoded.width, encoded.height), (200, 150));

        let decoded = decode_output(&encoded);
        assert_eq!(decoded.width(), 200);
        assert_eq!(decoded.height(), 150);
    }

    #[test]
    fn render_upscale_exact_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("small.jpg");
        create_test_jpeg(&source, 50, 40);

        let encoded = render(&source, 160, 128).unwrap();
        let decoded = decode_output(&encoded);
        assert_eq!((decoded.width(), decoded.height()), (160, 128));
    }

    #[test]
    fn render_output_is_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("summit.jpg");
        create_test_jpeg(&source, 100, 100);

        let encoded = render(&source, 75, 75).unwrap();
        assert_eq!(&encoded.bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(
            image::guess_format(&encoded.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn render_flattens_alpha_to_rgb() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("transparent.png");
        create_test_png_rgba(&source, 120, 80);

        let encoded = render(&source, 60, 40).unwrap();
        let decoded = decode_output(&encoded);
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (60, 40));
    }

    #[test]
    fn render_converts_grey_alpha_to_rgb() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("grey.png");
        create_test_png_gray_alpha(&source, 80, 80);

        let encoded = render(&source, 40, 40).unwrap();
        let decoded = decode_output(&encoded);
        assert_eq!(decoded.color(), ColorType::Rgb8);
        assert_eq!((decoded.width(), decoded.height()), (40, 40));

        // grey stays grey once expanded to three channels
        let pixel = decoded.to_rgb8().get_pixel(30, 20).0;
        let spread = pixel.iter().max().unwrap() - pixel.iter().min().unwrap();
        assert!(spread <= 6, "{pixel:?}");
    }

    #[test]
    fn optimized_tables_are_no_larger_than_baseline() {
        let img = RgbImage::from_fn(320, 180, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let quality = Quality::new(85);

        let optimized = encode_jpeg(&img, quality).unwrap();
        let baseline = encode_jpeg_with(&img, quality, false).unwrap();
        assert!(
            optimized.len() <= baseline.len(),
            "optimized {} > baseline {}",
            optimized.len(),
            baseline.len()
        );
        assert_eq!(
            image::guess_format(&optimized).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn oversized_canvas_is_encode_error() {
        let img = RgbImage::new(70_000, 1);
        let err = encode_jpeg(&img, Quality::default()).unwrap_err();
        assert!(matches!(err, BackendError::Encode(_)));
    }

    #[test]
    fn render_missing_source_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = render(&tmp.path().join("nope.jpg"), 75, 42).unwrap_err();
        assert!(matches!(err, BackendError::SourceNotFound(_)));
    }

    #[test]
    fn render_directory_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = render(tmp.path(), 75, 42).unwrap_err();
        assert!(matches!(err, BackendError::SourceNotFound(_)));
    }

    #[test]
    fn render_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not an image").unwrap();

        let err = render(&source, 75, 42).unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }), "got {err:?}");
    }

    #[test]
    fn lower_quality_produces_smaller_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("summit.jpg");
        create_test_jpeg(&source, 400, 300);

        let backend = RustBackend::new();
        let params = |q| RenderParams {
            source: source.clone(),
            width: 400,
            height: 300,
            quality: Quality::new(q),
        };
        let high = backend.render_jpeg(&params(95)).unwrap();
        let low = backend.render_jpeg(&params(10)).unwrap();
        assert!(low.len() < high.len());
    }
}
