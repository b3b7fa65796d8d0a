//! # Summit Upload
//!
//! Publishes one photo of a summit page. A summit YAML file lists the page's
//! images and, for each, the storage keys of its two renditions. Given a
//! local photo and an index into that list, the tool renders both renditions
//! and uploads them to S3-compatible storage.
//!
//! # Workflow
//!
//! ```text
//! summit.yaml[index] ──► (url, preview_url)
//! photo.jpg ──► 1600px JPEG ──► s3://<bucket>/<url>
//! photo.jpg ──►   75px JPEG ──► s3://<bucket>/<preview_url>
//! ```
//!
//! Everything runs on one thread, in that order, and stops at the first
//! failure. See [`upload`] for the exact sequence and its failure semantics.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Reads the summit YAML file and selects one entry |
//! | [`imaging`] | Pure-Rust resize + JPEG encode into memory |
//! | [`storage`] | Credentials, the [`storage::ObjectStore`] seam and the blocking S3 client |
//! | [`config`] | Optional TOML config: endpoint, bucket, variant widths, quality |
//! | [`upload`] | The end-to-end workflow and its progress events |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Decode Per Variant
//!
//! Each rendition decodes the source on its own. The second decode costs a
//! little time but no bitmap outlives the render that produced it, and the
//! preview is always resampled from the original pixels rather than from the
//! 1600px main image.
//!
//! ## Render Everything, Then Upload
//!
//! Both JPEGs exist in memory before the first request is sent. A corrupt or
//! missing photo therefore never produces a main image without its preview.
//!
//! ## Explicit Credentials
//!
//! The storage client never reads the environment. The binary reads
//! `S3_ACCESS_KEY` / `S3_SECRET_KEY` once, after the manifest entry is
//! selected and before the photo is rendered, and hands them to
//! [`storage::S3Store::new`]; tests pass their own store instead.
//!
//! ## Path-Style Addressing
//!
//! The storage endpoint does not resolve `<bucket>.<host>` names, so the
//! client always puts the bucket in the URL path.

pub mod config;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod storage;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
