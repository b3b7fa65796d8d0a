//! CLI output formatting.
//!
//! Progress goes to stdout, errors to stderr. A successful run looks like:
//!
//! ```text
//! ==> Reading summit file: summits/elbrus.yaml
//! ==> Image at index 0
//!     Main URL: summits/elbrus/main.jpg
//!     Preview URL: summits/elbrus/preview.jpg
//! ==> Resizing photos/elbrus.jpg
//!     main: 1600x900 (412.7 KB)
//!     preview: 75x42 (1.9 KB)
//! ==> Uploading to bucket 'summit-photos'
//!     ✓ Uploaded to s3://summit-photos/summits/elbrus/main.jpg
//!     ✓ Uploaded to s3://summit-photos/summits/elbrus/preview.jpg
//! ✓ Successfully uploaded 2 images to S3
//! ```
//!
//! Failures print a single `✗ Error: …` line to stderr.
//!
//! Each `format_*` function returns lines (pure, testable) and has a
//! `print_*` wrapper that does the writing.

use crate::storage::object_url;
use crate::upload::{UploadEvent, UploadReport};
use std::fmt::Display;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte size: `812 B`, `1.9 KB`, `2.4 MB`.
fn format_bytes(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Format one workflow event as output lines.
pub fn format_upload_event(event: &UploadEvent) -> Vec<String> {
    match event {
        UploadEvent::ReadingManifest { path } => {
            vec![format!("==> Reading summit file: {}", path.display())]
        }
        UploadEvent::EntrySelected { index, entry } => vec![
            format!("==> Image at index {}", index),
            format!("{}Main URL: {}", indent(1), entry.url),
            format!("{}Preview URL: {}", indent(1), entry.preview_url),
        ],
        UploadEvent::Rendering { source } => {
            vec![format!("==> Resizing {}", source.display())]
        }
        UploadEvent::VariantRendered {
            kind,
            width,
            height,
            bytes,
        } => vec![format!(
            "{}{}: {}x{} ({})",
            indent(1),
            kind,
            width,
            height,
            format_bytes(*bytes)
        )],
        UploadEvent::Uploading { bucket } => {
            vec![format!("==> Uploading to bucket '{}'", bucket)]
        }
        UploadEvent::ObjectUploaded { bucket, key } => vec![format!(
            "{}\u{2713} Uploaded to {}",
            indent(1),
            object_url(bucket, key)
        )],
        UploadEvent::RolledBack { bucket, key } => vec![format!(
            "{}\u{21BA} Removed {}",
            indent(1),
            object_url(bucket, key)
        )],
        UploadEvent::RollbackFailed {
            bucket,
            key,
            reason,
        } => vec![format!(
            "{}\u{2717} Could not remove {}: {}",
            indent(1),
            object_url(bucket, key),
            reason
        )],
    }
}

pub fn print_upload_event(event: &UploadEvent) {
    for line in format_upload_event(event) {
        println!("{}", line);
    }
}

/// Final banner for a successful run.
pub fn format_success(report: &UploadReport) -> Vec<String> {
    vec![format!(
        "\u{2713} Successfully uploaded {} images to S3",
        report.uploaded.len()
    )]
}

pub fn print_success(report: &UploadReport) {
    for line in format_success(report) {
        println!("{}", line);
    }
}

/// Single-line failure message.
pub fn format_error(err: &dyn Display) -> String {
    format!("\u{2717} Error: {}", err)
}

pub fn print_error(err: &dyn Display) {
    eprintln!("{}", format_error(err));
}
