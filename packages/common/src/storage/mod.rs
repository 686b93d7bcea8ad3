mod error;
mod key;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::AssetError;
pub use key::AssetKey;
pub use traits::{AssetHost, RenameOptions, StoredAsset};
