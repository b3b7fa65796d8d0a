//! The upload workflow.
//!
//! One run handles one manifest entry, strictly in order:
//!
//! ```text
//! 1. Load manifest   summit.yaml[index] → (url, preview_url)
//! 2. Render main     source → 1600px JPEG in memory
//! 3. Render preview  source → 75px JPEG in memory
//! 4. Upload main     → <bucket>/<url>
//! 5. Upload preview  → <bucket>/<preview_url>
//! ```
//!
//! Any failure stops the run. Both variants are rendered before the first
//! upload, so a bad source image never leaves a half-uploaded entry behind.
//! The uploads themselves are not atomic: if the preview upload fails after
//! the main upload succeeded, the main object stays in storage unless
//! [`RollbackPolicy::DeleteUploaded`] is chosen, in which case a best-effort
//! delete is attempted. Re-running with the same arguments overwrites both
//! keys.
//!
//! Progress is reported through an `on_event` callback so the CLI can print
//! it while tests collect it.

use crate::config::VariantsConfig;
use crate::imaging::{BackendError, ImageBackend, RenderedVariant, VariantKind, render_variant};
use crate::manifest::{self, ImageEntry, ManifestError};
use crate::storage::{JPEG_CONTENT_TYPE, ObjectStore, StorageError, object_url};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Imaging(#[from] BackendError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What to do when the second upload fails after the first succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackPolicy {
    /// Leave the uploaded object in place.
    #[default]
    KeepUploaded,
    /// Try to delete objects this run already uploaded.
    DeleteUploaded,
}

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub image_path: PathBuf,
    pub manifest_path: PathBuf,
    pub index: i64,
    pub variants: VariantsConfig,
    pub rollback: RollbackPolicy,
}

/// Progress events emitted by [`run`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    ReadingManifest {
        path: PathBuf,
    },
    EntrySelected {
        index: i64,
        entry: ImageEntry,
    },
    Rendering {
        source: PathBuf,
    },
    VariantRendered {
        kind: VariantKind,
        width: u32,
        height: u32,
        bytes: usize,
    },
    Uploading {
        bucket: String,
    },
    ObjectUploaded {
        bucket: String,
        key: String,
    },
    RolledBack {
        bucket: String,
        key: String,
    },
    RollbackFailed {
        bucket: String,
        key: String,
        reason: String,
    },
}

/// A variant that made it to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub kind: VariantKind,
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub bucket: String,
    pub entry: ImageEntry,
    pub uploaded: Vec<UploadedObject>,
}

impl UploadReport {
    pub fn urls(&self) -> Vec<String> {
        self.uploaded
            .iter()
            .map(|object| object_url(&self.bucket, &object.key))
            .collect()
    }
}

/// Run the workflow for one manifest entry.
///
/// Equivalent to [`select_entry`] followed by [`upload_entry`]. Callers that
/// need to do work between the two (the CLI builds its storage client there)
/// call them separately.
pub fn run(
    request: &UploadRequest,
    backend: &impl ImageBackend,
    store: &impl ObjectStore,
    mut on_event: impl FnMut(UploadEvent),
) -> Result<UploadReport, UploadError> {
    let entry = select_entry(request, &mut on_event)?;
    upload_entry(request, entry, backend, store, on_event)
}

/// Step 1: read the manifest and pick the requested entry.
pub fn select_entry(
    request: &UploadRequest,
    mut on_event: impl FnMut(UploadEvent),
) -> Result<ImageEntry, UploadError> {
    on_event(UploadEvent::ReadingManifest {
        path: request.manifest_path.clone(),
    });
    let entry = manifest::load_entry(&request.manifest_path, request.index)?;
    on_event(UploadEvent::EntrySelected {
        index: request.index,
        entry: entry.clone(),
    });
    Ok(entry)
}

/// Steps 2-5: render both variants, then upload them to the entry's keys.
pub fn upload_entry(
    request: &UploadRequest,
    entry: ImageEntry,
    backend: &impl ImageBackend,
    store: &impl ObjectStore,
    mut on_event: impl FnMut(UploadEvent),
) -> Result<UploadReport, UploadError> {
    on_event(UploadEvent::Rendering {
        source: request.image_path.clone(),
    });
    let quality = request.variants.quality();
    let mut rendered = Vec::with_capacity(2);
    for spec in [request.variants.main(), request.variants.preview()] {
        let variant = render_variant(backend, &request.image_path, spec, quality)?;
        on_event(UploadEvent::VariantRendered {
            kind: variant.kind,
            width: variant.image.width,
            height: variant.image.height,
            bytes: variant.image.len(),
        });
        rendered.push(variant);
    }

    let bucket = store.bucket().to_string();
    on_event(UploadEvent::Uploading {
        bucket: bucket.clone(),
    });

    let mut uploaded: Vec<UploadedObject> = Vec::with_capacity(rendered.len());
    for variant in rendered {
        let key = destination_key(&entry, variant.kind).to_string();
        if let Err(err) = upload_variant(store, &key, &variant) {
            if request.rollback == RollbackPolicy::DeleteUploaded {
                roll_back(store, &uploaded, &mut on_event);
            }
            return Err(err.into());
        }
        on_event(UploadEvent::ObjectUploaded {
            bucket: bucket.clone(),
            key: key.clone(),
        });
        uploaded.push(UploadedObject {
            kind: variant.kind,
            key,
            width: variant.image.width,
            height: variant.image.height,
            bytes: variant.image.len(),
        });
    }

    Ok(UploadReport {
        bucket,
        entry,
        uploaded,
    })
}

fn destination_key(entry: &ImageEntry, kind: VariantKind) -> &str {
    match kind {
        VariantKind::Main => &entry.url,
        VariantKind::Preview => &entry.preview_url,
    }
}

fn upload_variant(
    store: &impl ObjectStore,
    key: &str,
    variant: &RenderedVariant,
) -> Result<(), StorageError> {
    debug!(variant = %variant.kind, key, "uploading variant");
    store.put_object(key, &variant.image.bytes, JPEG_CONTENT_TYPE)
}

/// Best-effort delete of everything uploaded so far. Failures are reported,
/// never raised: the original upload error is what the caller sees.
fn roll_back(
    store: &impl ObjectStore,
    uploaded: &[UploadedObject],
    on_event: &mut impl FnMut(UploadEvent),
) {
    let bucket = store.bucket().to_string();
    for object in uploaded.iter().rev() {
        match store.delete_object(&object.key) {
            Ok(()) => on_event(UploadEvent::RolledBack {
                bucket: bucket.clone(),
                key: object.key.clone(),
            }),
            Err(err) => {
                warn!(key = %object.key, error = %err, "rollback delete failed");
                on_event(UploadEvent::RollbackFailed {
                    bucket: bucket.clone(),
                    key: object.key.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
}
