//! Summit manifest loading.
//!
//! A summit file is YAML with a top-level `images` list. Each entry names the
//! storage keys its renditions are uploaded to:
//!
//! ```yaml
//! images:
//!   - url: summits/elbrus/main.jpg
//!     preview_url: summits/elbrus/preview.jpg
//!     caption: West summit at dawn   # ignored
//!   - url: summits/elbrus/ridge.jpg
//!     preview_url: summits/elbrus/ridge-preview.jpg
//! ```
//!
//! Only `url` and `preview_url` are read. Everything else in the file is
//! ignored, so the same file can carry whatever the site needs.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing YAML file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("No 'images' list found in YAML file")]
    MissingImages,
    #[error("Index {index} out of range. Found {len} images.")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("'{field}' not found in image entry {index}")]
    MissingField { index: usize, field: &'static str },
}

/// Destination keys for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// Key for the main variant.
    pub url: String,
    /// Key for the preview variant.
    pub preview_url: String,
}

/// Entries stay untyped until one is selected: the rest of the list may hold
/// anything the site needs.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    images: Option<Vec<serde_yaml::Value>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    preview_url: Option<String>,
}

/// Parse manifest text and select the entry at `index`.
///
/// `index` is signed so a negative value from the command line is reported
/// as out of range rather than rejected by the argument parser.
pub fn parse_entry(content: &str, index: i64) -> Result<ImageEntry, ManifestError> {
    let document: serde_yaml::Value = serde_yaml::from_str(content)?;
    if document.is_null() {
        return Err(ManifestError::MissingImages);
    }
    let manifest: RawManifest = serde_yaml::from_value(document)?;

    let images = match manifest.images {
        Some(images) if !images.is_empty() => images,
        _ => return Err(ManifestError::MissingImages),
    };

    let len = images.len();
    let position = usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(ManifestError::IndexOutOfRange { index, len })?;

    let selected = images
        .into_iter()
        .nth(position)
        .ok_or(ManifestError::IndexOutOfRange { index, len })?;

    // A non-mapping entry has no fields at all.
    let entry = if selected.is_mapping() {
        serde_yaml::from_value(selected)?
    } else {
        RawEntry::default()
    };

    Ok(ImageEntry {
        url: require_field(entry.url, position, "url")?,
        preview_url: require_field(entry.preview_url, position, "preview_url")?,
    })
}

fn require_field(
    value: Option<String>,
    index: usize,
    field: &'static str,
) -> Result<String, ManifestError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ManifestError::MissingField { index, field })
}

/// Read a summit file from disk and select the entry at `index`.
pub fn load_entry(path: &Path, index: i64) -> Result<ImageEntry, ManifestError> {
    let content = fs::read_to_string(path)?;
    parse_entry(&content, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TWO_ENTRIES: &str = r#"
name: Elbrus
images:
  - url: summits/elbrus/main.jpg
    preview_url: summits/elbrus/preview.jpg
    caption: West summit
  - url: summits/elbrus/ridge.jpg
    preview_url: summits/elbrus/ridge-preview.jpg
"#;

    #[test]
    fn selects_first_entry() {
        let entry = parse_entry(TWO_ENTRIES, 0).unwrap();
        assert_eq!(
            entry,
            ImageEntry {
                url: "summits/elbrus/main.jpg".into(),
                preview_url: "summits/elbrus/preview.jpg".into(),
            }
        );
    }

    #[test]
    fn selects_last_entry() {
        let entry = parse_entry(TWO_ENTRIES, 1).unwrap();
        assert_eq!(entry.url, "summits/elbrus/ridge.jpg");
        assert_eq!(entry.preview_url, "summits/elbrus/ridge-preview.jpg");
    }

    #[test]
    fn keys_are_returned_unmodified() {
        let yaml = r#"
images:
  - url: " spaced/Key With Caps.JPG "
    preview_url: "unicode/вершина.jpg"
"#;
        let entry = parse_entry(yaml, 0).unwrap();
        assert_eq!(entry.url, " spaced/Key With Caps.JPG ");
        assert_eq!(entry.preview_url, "unicode/вершина.jpg");
    }

    #[test]
    fn index_past_end_reports_index_and_length() {
        let err = parse_entry(TWO_ENTRIES, 5).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::IndexOutOfRange { index: 5, len: 2 }
        ));
        let msg = err.to_string();
        assert!(msg.contains('5'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn index_equal_to_length_is_out_of_range() {
        let err = parse_entry(TWO_ENTRIES, 2).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::IndexOutOfRange { index: 2, len: 2 }
        ));
    }

    #[test]
    fn negative_index_is_out_of_range() {
        let err = parse_entry(TWO_ENTRIES, -1).unwrap_err();
        assert_eq!(err.to_string(), "Index -1 out of range. Found 2 images.");
    }

    #[test]
    fn missing_images_key() {
        let err = parse_entry("name: Elbrus\n", 0).unwrap_err();
        assert!(matches!(err, ManifestError::MissingImages));
    }

    #[test]
    fn empty_images_list() {
        let err = parse_entry("images: []\n", 0).unwrap_err();
        assert!(matches!(err, ManifestError::MissingImages));
    }

    #[test]
    fn null_images_value() {
        let err = parse_entry("images:\n", 0).unwrap_err();
        assert!(matches!(err, ManifestError::MissingImages));
    }

    #[test]
    fn missing_images_wins_over_bad_index() {
        let err = parse_entry("images: []\n", 7).unwrap_err();
        assert!(matches!(err, ManifestError::MissingImages));
    }

    #[test]
    fn missing_preview_url() {
        let yaml = "images:\n  - url: a/main.jpg\n";
        let err = parse_entry(yaml, 0).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField {
                index: 0,
                field: "preview_url"
            }
        ));
    }

    #[test]
    fn empty_url_counts_as_missing() {
        let yaml = "images:\n  - url: ''\n    preview_url: a/prev.jpg\n";
        let err = parse_entry(yaml, 0).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField { field: "url", .. }
        ));
    }

    #[test]
    fn other_entries_may_have_any_shape() {
        let yaml = r#"
images:
  - url: a/main.jpg
    preview_url: a/prev.jpg
  - just a caption string
  -
  - [x, y]
"#;
        let entry = parse_entry(yaml, 0).unwrap();
        assert_eq!(entry.url, "a/main.jpg");
        assert_eq!(entry.preview_url, "a/prev.jpg");
    }

    #[test]
    fn selected_scalar_entry_is_missing_url() {
        let yaml = "images:\n  - url: a/main.jpg\n    preview_url: a/prev.jpg\n  - just a caption\n";
        let err = parse_entry(yaml, 1).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField {
                index: 1,
                field: "url"
            }
        ));
    }

    #[test]
    fn selected_null_entry_is_missing_url() {
        let yaml = "images:\n  -\n  - url: b/main.jpg\n";
        let err = parse_entry(yaml, 0).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField { field: "url", .. }
        ));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse_entry("images: [unclosed\n", 0).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
        assert!(err.to_string().starts_with("Error parsing YAML file"));
    }

    #[test]
    fn load_entry_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("elbrus.yaml");
        fs::write(&path, TWO_ENTRIES).unwrap();

        let entry = load_entry(&path, 1).unwrap();
        assert_eq!(entry.url, "summits/elbrus/ridge.jpg");
    }

    #[test]
    fn load_entry_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_entry(&tmp.path().join("absent.yaml"), 0).unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
