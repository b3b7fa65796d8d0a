//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Each variant
//! is rendered from the source file independently: the source is identified,
//! decoded, resized and released per call, and no bitmap is shared between
//! the main and preview renders.

use super::backend::{BackendError, EncodedImage, ImageBackend};
use super::calculations::calculate_scaled_dimensions;
use super::params::{Quality, RenderParams, VariantKind, VariantSpec};
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// A rendered variant, labelled with what it is for.
#[derive(Debug, Clone)]
pub struct RenderedVariant {
    pub kind: VariantKind,
    pub image: EncodedImage,
}

/// Plan a render without executing it.
///
/// The height comes from the original dimensions, not from any earlier
/// resize.
pub fn plan_variant(
    source: &Path,
    original_dims: (u32, u32),
    spec: VariantSpec,
    quality: Quality,
) -> RenderParams {
    let (width, height) = calculate_scaled_dimensions(original_dims, spec.width);

    RenderParams {
        source: source.to_path_buf(),
        width,
        height,
        quality,
    }
}

/// Render one JPEG variant of `source` into memory.
pub fn render_variant(
    backend: &impl ImageBackend,
    source: &Path,
    spec: VariantSpec,
    quality: Quality,
) -> Result<RenderedVariant> {
    let original = get_dimensions(backend, source)?;
    let params = plan_variant(source, original, spec, quality);
    debug!(
        variant = %spec.kind,
        width = params.width,
        height = params.height,
        "planned variant"
    );

    let image = backend.render_jpeg(&params)?;
    Ok(RenderedVariant {
        kind: spec.kind,
        image,
    })
}
