// SPDX-License-Identifier: AGPL-3.0-or-later
//! Virtual file system facade for pathmux
//!
//! [`FileSystem`] routes each call to the backend registered for the path's
//! scheme. Composite operations (recursive delete, recursive directory
//! creation, copy, best-effort delete) are layered on top and work across
//! any mix of backends.

mod facade;
mod ops;

pub use facade::FileSystem;
pub use pathmux_core::{AccessMode, PmxError, PmxResult, TempFileOptions};
pub use pathmux_providers::{ProviderRegistry, RegistryConfig};

use std::sync::Arc;

impl FileSystem {
    /// File system backed by the registry `config` describes.
    pub fn from_config(config: &RegistryConfig) -> PmxResult<Self> {
        Ok(Self::new(Arc::new(config.build()?)))
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(Arc::new(ProviderRegistry::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_default_config() {
        let fs = FileSystem::from_config(&RegistryConfig::default()).unwrap();
        assert!(fs.exists("memFS:/").await);
        assert!(fs.create_file("memFS:/note").await.unwrap());
        assert_eq!(fs.registry().schemes(), vec!["memFS"]);
    }

    #[tokio::test]
    async fn test_default_serves_local_disk_only() {
        let fs = FileSystem::default();
        let dir = tempfile::tempdir().unwrap();
        assert!(fs.is_directory(&dir.path().to_string_lossy()).await);
        assert!(fs.registry().schemes().is_empty());
    }
}
