use async_trait::async_trait;
use serde::Serialize;

use super::error::AssetError;

/// An asset as addressed on the host after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    /// Key the asset now lives under.
    pub key: String,
    /// Absolute URL the asset is served from.
    pub url: String,
}

/// Options for [`AssetHost::rename`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    /// Replace an existing asset at the destination key instead of failing
    /// with a conflict.
    pub overwrite: bool,
}

/// Key-addressed storage for binary image assets.
///
/// Failures carry an HTTP-like status through [`AssetError::status_code`]:
/// `404` when the source is missing, `409` when the destination exists.
#[async_trait]
pub trait AssetHost: Send + Sync {
    /// Store bytes under `key`, replacing any previous asset with that key.
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<StoredAsset, AssetError>;

    /// Move the asset at `from` to `to`.
    async fn rename(
        &self,
        from: &str,
        to: &str,
        options: RenameOptions,
    ) -> Result<StoredAsset, AssetError>;

    /// Retrieve all bytes of an asset.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, AssetError>;

    /// Delete an asset.
    ///
    /// Returns `true` if the asset was deleted, `false` if it did not exist.
    async fn delete(&self, key: &str) -> Result<bool, AssetError>;
}
