use std::fmt;

use super::error::AssetError;

/// Longest key accepted by any host.
const MAX_KEY_LENGTH: usize = 200;

/// A validated asset key.
///
/// Keys are flat names: ASCII letters, digits, `_`, `-` and `.`, not starting
/// with `.`. This keeps them safe to use as file names and object paths.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AssetKey(String);

impl AssetKey {
    /// Validate a raw key string.
    pub fn parse(raw: &str) -> Result<Self, AssetError> {
        if raw.is_empty() {
            return Err(AssetError::InvalidKey("key must not be empty".into()));
        }
        if raw.len() > MAX_KEY_LENGTH {
            return Err(AssetError::InvalidKey(format!(
                "expected at most {MAX_KEY_LENGTH} characters, got {}",
                raw.len()
            )));
        }
        if raw.starts_with('.') {
            return Err(AssetError::InvalidKey(format!(
                "'{raw}' must not start with '.'"
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(AssetError::InvalidKey(format!(
                "'{raw}' contains forbidden character {bad:?}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetKey({})", self.0)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
