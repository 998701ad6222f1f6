// SPDX-License-Identifier: AGPL-3.0-or-later
//! Registry configuration
//!
//! A TOML mount table lists the backends to register at startup. Mount order
//! is match priority.
//!
//! ```toml
//! default = "local"
//!
//! [[mount]]
//! scheme = "mem"
//! kind = "memory"
//!
//! [[mount]]
//! scheme = "ro"
//! kind = "read-only"
//! inner = "mem"
//! ```

use pathmux_core::{path, FileBackend, PmxError, PmxResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::{MemoryBackend, ProviderRegistry, ReadOnlyBackend, MEMORY_SCHEME};

/// Name of the local disk backend in configuration files
pub const LOCAL_BACKEND: &str = "local";

fn default_backend() -> String {
    LOCAL_BACKEND.to_string()
}

/// Kind of backend a mount creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MountKind {
    Memory,
    ReadOnly,
}

/// One `[[mount]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    pub scheme: String,
    pub kind: MountKind,
    /// Wrapped backend for `read-only` mounts: an earlier mount's scheme or
    /// `"local"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner: Option<String>,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Backend serving unclaimed paths
    #[serde(default = "default_backend")]
    pub default: String,
    #[serde(default, rename = "mount")]
    pub mounts: Vec<MountConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default: default_backend(),
            mounts: vec![MountConfig {
                scheme: MEMORY_SCHEME.to_string(),
                kind: MountKind::Memory,
                inner: None,
            }],
        }
    }
}

impl RegistryConfig {
    pub fn from_toml(source: &str) -> PmxResult<Self> {
        toml::from_str(source).map_err(|e| PmxError::Config(e.to_string()))
    }

    /// Load from `path`, falling back to the default configuration when the
    /// file does not exist.
    pub fn load(path: &Path) -> PmxResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml(&source),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no registry config, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(PmxError::Config(format!("{}: {e}", path.display()))),
        }
    }

    /// Build a registry with every mount registered in file order.
    pub fn build(&self) -> PmxResult<ProviderRegistry> {
        if self.default != LOCAL_BACKEND {
            return Err(PmxError::Config(format!(
                "unsupported default backend {:?}, only {LOCAL_BACKEND:?} can serve unclaimed paths",
                self.default
            )));
        }

        let registry = ProviderRegistry::with_local();
        for mount in &self.mounts {
            if !path::is_valid_scheme(&mount.scheme) || mount.scheme == LOCAL_BACKEND {
                return Err(PmxError::Config(format!("invalid scheme {:?}", mount.scheme)));
            }
            if registry.get(&mount.scheme).is_some() {
                return Err(PmxError::Config(format!("scheme {:?} mounted twice", mount.scheme)));
            }

            let backend: Arc<dyn FileBackend> = match mount.kind {
                MountKind::Memory => Arc::new(MemoryBackend::with_scheme(&mount.scheme)),
                MountKind::ReadOnly => {
                    let inner = self.inner_backend(&registry, mount)?;
                    Arc::new(ReadOnlyBackend::with_scheme(&mount.scheme, inner))
                }
            };
            tracing::info!(scheme = %mount.scheme, kind = ?mount.kind, "mounted backend");
            registry.register(backend);
        }

        Ok(registry)
    }

    fn inner_backend(&self, registry: &ProviderRegistry, mount: &MountConfig) -> PmxResult<Arc<dyn FileBackend>> {
        let name = mount.inner.as_deref().ok_or_else(|| {
            PmxError::Config(format!("read-only mount {:?} needs an inner backend", mount.scheme))
        })?;
        if name == LOCAL_BACKEND {
            return Ok(registry.default_backend());
        }
        registry.get(name).ok_or_else(|| {
            PmxError::Config(format!(
                "mount {:?} wraps {name:?}, which is not mounted before it",
                mount.scheme
            ))
        })
    }
}
