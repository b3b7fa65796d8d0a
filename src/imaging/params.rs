//! Parameter types for image operations.
//!
//! These structs describe *what* to render, not *how*. They sit between the
//! high-level [`operations`](super::operations) module (which decides which
//! variants a run needs) and the [`backend`](super::backend) (which does the
//! pixel work). Keeping them plain data lets tests swap in a mock backend
//! without touching the operation logic.
//!
//! ## Types
//!
//! - [`Quality`] — JPEG quality (1–100, default 85). Clamped on construction.
//! - [`VariantKind`] — Which of the two uploaded variants this is.
//! - [`VariantSpec`] — Kind + target width, as configured.
//! - [`RenderParams`] — Everything one render needs: source, exact output size, quality.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for JPEG encoding (1-100).
///
/// Only [`Quality::new`] builds one, so the value is always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        // clamped to 1..=100, fits in u8
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u32 {
        u32::from(self.0)
    }

    /// The form JPEG encoders take.
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// The two renditions uploaded for every manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// Full-size image shown on the summit page.
    Main,
    /// Tiny placeholder shown while the main image loads.
    Preview,
}

impl VariantKind {
    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Main => "main",
            VariantKind::Preview => "preview",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A variant as configured: what it is and how wide it should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub kind: VariantKind,
    pub width: u32,
}

impl VariantSpec {
    pub fn main(width: u32) -> Self {
        Self {
            kind: VariantKind::Main,
            width,
        }
    }

    pub fn preview(width: u32) -> Self {
        Self {
            kind: VariantKind::Preview,
            width,
        }
    }
}

/// Parameters for rendering one JPEG variant into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub source: PathBuf,
    /// Exact output dimensions; aspect ratio is already resolved.
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
