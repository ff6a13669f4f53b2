//! Cache mirror configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Local snapshot mirror configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory for session snapshot files
    #[serde(default = "default_mirror_dir")]
    pub mirror_dir: String,
}

impl CacheConfig {
    /// Mirror directory as a path
    pub fn mirror_path(&self) -> PathBuf {
        PathBuf::from(&self.mirror_dir)
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mirror_dir.is_empty() {
            return Err(ValidationError::EmptyMirrorDir);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mirror_dir: default_mirror_dir(),
        }
    }
}

fn default_mirror_dir() -> String {
    ".tandem/sessions".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dir_is_relative() {
        let config = CacheConfig::default();
        assert_eq!(config.mirror_path(), PathBuf::from(".tandem/sessions"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_dir_is_rejected() {
        let config = CacheConfig {
            mirror_dir: String::new(),
        };
        assert!(config.validate().is_err());
    }
}
