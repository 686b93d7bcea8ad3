use thiserror::Error;

/// Errors reported by an [`AssetHost`](super::AssetHost).
///
/// Callers that need to tell failure modes apart should look at
/// [`AssetError::status_code`] rather than at the variant, so that local and
/// remote hosts classify the same way.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The addressed asset does not exist.
    #[error("asset not found: {0}")]
    NotFound(String),
    /// The destination key is already taken and overwriting was not allowed.
    #[error("asset already exists: {0}")]
    Conflict(String),
    /// The key cannot be used to address an asset.
    #[error("invalid asset key: {0}")]
    InvalidKey(String),
    /// The asset exceeds the configured size limit.
    #[error("asset exceeds size limit ({actual} > {limit} bytes)")]
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The remote host answered with an unexpected status.
    #[error("asset host responded with status {status}: {message}")]
    Remote { status: u16, message: String },
    /// The host client failed before a status was available.
    #[error("asset host error: {0}")]
    Backend(String),
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetError {
    /// HTTP-like status describing the failure, when one applies.
    ///
    /// `404` means the source asset is missing, `409` means the destination
    /// key is already in use.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Conflict(_) => Some(409),
            Self::InvalidKey(_) => Some(400),
            Self::SizeLimitExceeded { .. } => Some(413),
            Self::Remote { status, .. } => Some(*status),
            Self::Backend(_) | Self::Io(_) => None,
        }
    }
}
