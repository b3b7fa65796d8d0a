//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the upload workflow
//! needs: identify (read dimensions) and render_jpeg (decode, resize, encode
//! into memory).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the pure-Rust
//! `image` crate. Tests use the recording `MockBackend` below.

use super::params::RenderParams;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Failed to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },
    #[error("JPEG encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A rendered JPEG held in memory, ready for upload.
///
/// Owned by whoever asked for it; nothing is written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions without a full decode where the format allows.
    fn identify(&self, path: &std::path::Path) -> Result<Dimensions, BackendError>;

    /// Decode the source, resample to the exact size in `params`, drop any
    /// alpha channel and encode as JPEG into memory.
    fn render_jpeg(&self, params: &RenderParams) -> Result<EncodedImage, BackendError>;
}
