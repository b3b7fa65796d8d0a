//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `resize_exact` |
//! | **Flatten** | `to_rgb8` (alpha discarded) |
//! | **Encode** | `JpegEncoder`, quality 85, into memory |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodedImage, ImageBackend};
pub use calculations::{calculate_height_for_width, calculate_scaled_dimensions};
pub use operations::{RenderedVariant, get_dimensions, plan_variant, render_variant};
pub use params::{Quality, RenderParams, VariantKind, VariantSpec};
pub use rust_backend::RustBackend;
