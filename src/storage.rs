//! Object storage uploads.
//!
//! The production store is [`S3Store`], a blocking `rust-s3` client pointed at
//! an S3-compatible endpoint. That endpoint does not serve virtual-hosted
//! buckets (`<bucket>.<host>`), so requests always use path-style addressing
//! (`<host>/<bucket>/<key>`).
//!
//! Credentials are not read here. The CLI driver reads them from the
//! environment once at startup ([`StorageCredentials::from_env`]) and passes
//! them to [`S3Store::new`].

use crate::config::StorageConfig;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the access key ID.
pub const ACCESS_KEY_VAR: &str = "S3_ACCESS_KEY";
/// Environment variable holding the secret access key.
pub const SECRET_KEY_VAR: &str = "S3_SECRET_KEY";

/// Content type for every uploaded variant.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3_ACCESS_KEY and S3_SECRET_KEY environment variables must be set")]
    MissingCredentials,
    #[error("Failed to configure storage client: {0}")]
    Client(String),
    #[error("Upload to {} failed: {source}", object_url(.bucket, .key))]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: S3Error,
    },
    #[error("Upload to {} rejected with HTTP {status}", object_url(.bucket, .key))]
    Rejected {
        bucket: String,
        key: String,
        status: u16,
    },
    #[error("Delete of {} failed: {message}", object_url(.bucket, .key))]
    Delete {
        bucket: String,
        key: String,
        message: String,
    },
}

/// `s3://bucket/key` form used in progress output and error messages.
pub fn object_url(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}

/// Access key pair for the storage service.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageCredentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl StorageCredentials {
    /// Read credentials from [`ACCESS_KEY_VAR`] and [`SECRET_KEY_VAR`].
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through an arbitrary lookup. Unset and empty
    /// values are both treated as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
        match (non_empty(ACCESS_KEY_VAR), non_empty(SECRET_KEY_VAR)) {
            (Some(access_key), Some(secret_key)) => Ok(Self {
                access_key,
                secret_key,
            }),
            _ => Err(StorageError::MissingCredentials),
        }
    }
}

/// Destination for rendered variants.
pub trait ObjectStore {
    /// Bucket every call writes to.
    fn bucket(&self) -> &str;

    /// Upload `bytes` under `key` with the given content type.
    fn put_object(&self, key: &str, bytes: &[u8], content_type: &str)
    -> Result<(), StorageError>;

    /// Remove `key`. Used only for best-effort rollback.
    fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}

/// Blocking S3-compatible store.
pub struct S3Store {
    bucket: Bucket,
}

impl S3Store {
    /// Build a client for `bucket` on the configured endpoint.
    ///
    /// No network traffic happens here; the first request is the first upload.
    pub fn new(
        config: &StorageConfig,
        bucket: &str,
        credentials: &StorageCredentials,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };
        let credentials = Credentials::new(
            Some(&credentials.access_key),
            Some(&credentials.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Client(e.to_string()))?;

        let bucket = Bucket::new(bucket, region, credentials)
            .map_err(|e| StorageError::Client(e.to_string()))?
            .with_path_style();
        debug!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %bucket.name,
            "configured storage client"
        );

        Ok(Self { bucket })
    }
}

impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.bucket.name
    }

    fn put_object(
        &self,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket.name, key, bytes = bytes.len(), "uploading object");
        let response = self
            .bucket
            .put_object_with_content_type(key, bytes, content_type)
            .map_err(|source| StorageError::Upload {
                bucket: self.bucket.name.clone(),
                key: key.to_string(),
                source,
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Rejected {
                bucket: self.bucket.name.clone(),
                key: key.to_string(),
                status,
            });
        }
        Ok(())
    }

    fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        debug!(bucket = %self.bucket.name, key, "deleting object");
        let response = self
            .bucket
            .delete_object(key)
            .map_err(|e| StorageError::Delete {
                bucket: self.bucket.name.clone(),
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Delete {
                bucket: self.bucket.name.clone(),
                key: key.to_string(),
                message: format!("HTTP {status}"),
            });
        }
        Ok(())
    }
}
