use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::error::S3Error;
use ::s3::{Bucket, Region};
use tracing::warn;

use super::error::AssetError;
use super::key::AssetKey;
use super::traits::{AssetHost, RenameOptions, StoredAsset};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{endpoint}`.
    pub path_style: bool,
    /// Prefix of the public asset URLs, e.g. a CDN in front of the bucket.
    pub public_base_url: String,
    pub max_size: u64,
}

/// Asset host backed by an S3-compatible object store.
///
/// S3 has no native rename: a rename is a server-side copy followed by a
/// delete of the source object.
pub struct S3AssetHost {
    bucket: Box<Bucket>,
    public_base_url: String,
    max_size: u64,
}

impl From<S3Error> for AssetError {
    fn from(err: S3Error) -> Self {
        AssetError::Backend(err.to_string())
    }
}

fn ensure_success(status: u16, key: &AssetKey, action: &str) -> Result<(), AssetError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(AssetError::NotFound(key.to_string())),
        _ => Err(AssetError::Remote {
            status,
            message: format!("{action} '{key}' failed"),
        }),
    }
}

impl S3AssetHost {
    pub fn new(settings: S3Settings) -> Result<Self, AssetError> {
        let region = Region::Custom {
            region: settings.region,
            endpoint: settings.endpoint,
        };
        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AssetError::Backend(format!("invalid S3 credentials: {e}")))?;

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)?;
        if settings.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self {
            bucket,
            public_base_url: settings.public_base_url.trim_end_matches('/').to_string(),
            max_size: settings.max_size,
        })
    }

    fn stored(&self, key: &AssetKey) -> StoredAsset {
        StoredAsset {
            key: key.to_string(),
            url: format!("{}/{}", self.public_base_url, key),
        }
    }

    async fn object_exists(&self, key: &AssetKey) -> Result<bool, AssetError> {
        let (_, status) = self.bucket.head_object(key.as_str()).await?;
        match status {
            200..=299 => Ok(true),
            404 => Ok(false),
            _ => Err(AssetError::Remote {
                status,
                message: format!("head '{key}' failed"),
            }),
        }
    }
}

#[async_trait]
impl AssetHost for S3AssetHost {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredAsset, AssetError> {
        let key = AssetKey::parse(key)?;
        if data.len() as u64 > self.max_size {
            return Err(AssetError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let response = self
            .bucket
            .put_object_with_content_type(
                key.as_str(),
                data,
                content_type.unwrap_or("application/octet-stream"),
            )
            .await?;
        ensure_success(response.status_code(), &key, "upload")?;

        Ok(self.stored(&key))
    }

    async fn rename(
        &self,
        from: &str,
        to: &str,
        options: RenameOptions,
    ) -> Result<StoredAsset, AssetError> {
        let from = AssetKey::parse(from)?;
        let to = AssetKey::parse(to)?;

        if !self.object_exists(&from).await? {
            return Err(AssetError::NotFound(from.to_string()));
        }
        if from == to {
            return Ok(self.stored(&to));
        }
        if !options.overwrite && self.object_exists(&to).await? {
            return Err(AssetError::Conflict(to.to_string()));
        }

        let status = self
            .bucket
            .copy_object_internal(from.as_str(), to.as_str())
            .await?;
        ensure_success(status, &from, "copy")?;

        // The copy already succeeded, so the asset is reachable under the new
        // key even if the source cannot be removed.
        match self.bucket.delete_object(from.as_str()).await {
            Ok(response) if (200..300).contains(&response.status_code()) => {}
            Ok(response) => warn!(
                key = %from,
                status = response.status_code(),
                "Source object left behind after rename"
            ),
            Err(e) => warn!(key = %from, error = %e, "Source object left behind after rename"),
        }

        Ok(self.stored(&to))
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        let key = AssetKey::parse(key)?;
        let response = self.bucket.get_object(key.as_str()).await?;
        ensure_success(response.status_code(), &key, "fetch")?;
        Ok(response.bytes().to_vec())
    }

    async fn delete(&self, key: &str) -> Result<bool, AssetError> {
        let key = AssetKey::parse(key)?;
        if !self.object_exists(&key).await? {
            return Ok(false);
        }
        let response = self.bucket.delete_object(key.as_str()).await?;
        ensure_success(response.status_code(), &key, "delete")?;
        Ok(true)
    }
}
