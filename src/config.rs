//! Upload configuration.
//!
//! Every setting has a built-in default, so the tool runs without any config
//! file. `--config <path>` points at a TOML file whose values are merged on
//! top of those defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [storage]
//! endpoint = "https://s3.timeweb.cloud"   # S3-compatible service URL
//! region = "us-east-1"                    # Signing region
//! bucket = "302f9aa7-62c4d4d3-ccfd-4077-86c8-cca52e0da376"
//!
//! [variants]
//! main_width = 1600                       # Main variant width in pixels
//! preview_width = 75                      # Preview variant width in pixels
//! quality = 85                            # JPEG quality (1-100)
//! ```
//!
//! Requests always use path-style addressing; the endpoint serves nothing else.
//!
//! Credentials never come from this file: see
//! [`StorageCredentials`](crate::storage::StorageCredentials).
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, VariantSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Storage service the summit site reads its photos from.
pub const DEFAULT_ENDPOINT: &str = "https://s3.timeweb.cloud";
/// Bucket used when neither `--bucket` nor the config file names one.
pub const DEFAULT_BUCKET: &str = "302f9aa7-62c4d4d3-ccfd-4077-86c8-cca52e0da376";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from an optional TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Where uploads go.
    pub storage: StorageConfig,
    /// What gets rendered.
    pub variants: VariantsConfig,
}

impl UploadConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = &self.storage.endpoint;
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Validation(
                "storage.endpoint must start with http:// or https://".into(),
            ));
        }
        if self.storage.bucket.is_empty() {
            return Err(ConfigError::Validation(
                "storage.bucket must not be empty".into(),
            ));
        }
        if self.variants.main_width == 0 || self.variants.preview_width == 0 {
            return Err(ConfigError::Validation(
                "variants widths must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.variants.quality) {
            return Err(ConfigError::Validation(
                "variants.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }
}

/// Object storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Base URL of the S3-compatible service.
    pub endpoint: String,
    /// Region used for request signing.
    pub region: String,
    /// Default destination bucket.
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

/// Rendered variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantsConfig {
    /// Width of the main variant in pixels.
    pub main_width: u32,
    /// Width of the preview variant in pixels.
    pub preview_width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            main_width: 1600,
            preview_width: 75,
            quality: 85,
        }
    }
}

impl VariantsConfig {
    pub fn main(&self) -> VariantSpec {
        VariantSpec::main(self.main_width)
    }

    pub fn preview(&self) -> VariantSpec {
        VariantSpec::preview(self.preview_width)
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(UploadConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<UploadConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: UploadConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// With no path, returns the validated defaults. With a path, the file must
/// exist and parse; its values override the defaults.
pub fn load_config(path: Option<&Path>) -> Result<UploadConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(stock_defaults_value()?, overlay)
}
