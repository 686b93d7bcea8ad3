use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::AssetError;
use super::key::AssetKey;
use super::traits::{AssetHost, RenameOptions, StoredAsset};

/// Filesystem-backed asset host.
///
/// Each asset is a single file named after its key:
/// `{root}/{key}`. Writes go through `{root}/.tmp` and are moved into place,
/// so readers never observe a partially written asset.
pub struct FilesystemAssetHost {
    root: PathBuf,
    public_base_url: String,
    max_size: u64,
}

impl FilesystemAssetHost {
    /// Create a new filesystem asset host.
    ///
    /// `public_base_url` is the prefix under which the server exposes the
    /// assets; an asset's URL is `{public_base_url}/{key}`.
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        max_size: u64,
    ) -> Result<Self, AssetError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn asset_path(&self, key: &AssetKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn url_for(&self, key: &AssetKey) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn stored(&self, key: &AssetKey) -> StoredAsset {
        StoredAsset {
            key: key.to_string(),
            url: self.url_for(key),
        }
    }
}

#[async_trait]
impl AssetHost for FilesystemAssetHost {
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        _content_type: Option<&str>,
    ) -> Result<StoredAsset, AssetError> {
        let key = AssetKey::parse(key)?;
        if data.len() as u64 > self.max_size {
            return Err(AssetError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, self.asset_path(&key)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

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
        let source = self.asset_path(&from);
        let destination = self.asset_path(&to);

        if !fs::try_exists(&source).await? {
            return Err(AssetError::NotFound(from.to_string()));
        }
        if from == to {
            return Ok(self.stored(&to));
        }
        if options.overwrite {
            return match fs::rename(&source, &destination).await {
                Ok(()) => Ok(self.stored(&to)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(AssetError::NotFound(from.to_string()))
                }
                Err(e) => Err(e.into()),
            };
        }

        // rename(2) replaces an existing target; linking fails instead, so
        // only one of several concurrent moves onto `to` can win.
        match fs::hard_link(&source, &destination).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AssetError::Conflict(to.to_string()));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssetError::NotFound(from.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        match fs::remove_file(&source).await {
            Ok(()) => Ok(self.stored(&to)),
            // Source already gone; the link is the only copy now.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(self.stored(&to)),
            Err(e) => {
                let _ = fs::remove_file(&destination).await;
                Err(e.into())
            }
        }
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>, AssetError> {
        let key = AssetKey::parse(key)?;
        match fs::read(self.asset_path(&key)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AssetError> {
        let key = AssetKey::parse(key)?;
        match fs::remove_file(self.asset_path(&key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
