// SPDX-License-Identifier: AGPL-3.0-or-later
//! Registry of storage backends
//!
//! Backends are kept in registration order, which is also their match
//! priority. The backend list is copy-on-write: `resolve` works on an `Arc`
//! snapshot, `register` swaps in a new list, so a lookup never observes a
//! half-applied registration.

use parking_lot::RwLock;
use pathmux_core::FileBackend;
use std::sync::Arc;

use crate::LocalBackend;

type BackendList = Arc<Vec<Arc<dyn FileBackend>>>;

/// Registry of storage backends
pub struct ProviderRegistry {
    default: Arc<dyn FileBackend>,
    backends: RwLock<BackendList>,
}

impl ProviderRegistry {
    /// Create a registry whose unclaimed paths go to `default`.
    pub fn new(default: Arc<dyn FileBackend>) -> Self {
        Self {
            default,
            backends: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Registry with the local disk as default backend
    pub fn with_local() -> Self {
        Self::new(Arc::new(LocalBackend::new()))
    }

    /// Add a backend, or replace the one already claiming the same scheme
    /// while keeping its position.
    pub fn register(&self, backend: Arc<dyn FileBackend>) {
        let mut guard = self.backends.write();
        let mut next: Vec<Arc<dyn FileBackend>> = guard.as_ref().clone();

        match next.iter().position(|b| b.scheme() == backend.scheme()) {
            Some(index) => {
                tracing::debug!(scheme = backend.scheme(), index, "replacing backend");
                next[index] = backend;
            }
            None => {
                tracing::debug!(scheme = backend.scheme(), "registering backend");
                next.push(backend);
            }
        }

        *guard = Arc::new(next);
    }

    /// Backend owning `path`: the first registered one accepting it, or the
    /// default backend.
    pub fn resolve(&self, path: &str) -> Arc<dyn FileBackend> {
        let snapshot = self.snapshot();
        let backend = snapshot
            .iter()
            .find(|b| b.accepts(path))
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        tracing::trace!(path, scheme = backend.scheme(), "resolved backend");
        backend
    }

    /// Look a backend up by scheme, the default backend included.
    pub fn get(&self, scheme: &str) -> Option<Arc<dyn FileBackend>> {
        self.snapshot()
            .iter()
            .find(|b| b.scheme() == scheme)
            .cloned()
            .or_else(|| (self.default.scheme() == scheme).then(|| self.default.clone()))
    }

    pub fn default_backend(&self) -> Arc<dyn FileBackend> {
        self.default.clone()
    }

    /// Registered schemes in match order (default backend excluded)
    pub fn schemes(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|b| b.scheme().to_string())
            .collect()
    }

    fn snapshot(&self) -> BackendList {
        self.backends.read().clone()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;
    use async_trait::async_trait;
    use pathmux_core::{AccessMode, ByteReader, ByteWriter, FileHandle, PmxError, PmxResult};

    /// Backend claiming every path that starts with a raw string prefix
    struct PrefixClaim {
        scheme: String,
        prefix: String,
    }

    impl PrefixClaim {
        fn new(scheme: &str, prefix: &str) -> Arc<Self> {
            Arc::new(Self {
                scheme: scheme.into(),
                prefix: prefix.into(),
            })
        }
    }

    fn unsupported<T>() -> PmxResult<T> {
        Err(PmxError::Unsupported("test backend".into()))
    }

    #[async_trait]
    impl FileBackend for PrefixClaim {
        fn scheme(&self) -> &str {
            &self.scheme
        }
        fn display_name(&self) -> &str {
            "Prefix claim"
        }
        fn accepts(&self, path: &str) -> bool {
            path.starts_with(&self.prefix)
        }
        async fn exists(&self, _path: &str) -> bool {
            false
        }
        async fn create_directory(&self, _path: &str) -> PmxResult<()> {
            unsupported()
        }
        async fn create_file(&self, _path: &str) -> PmxResult<bool> {
            unsupported()
        }
        async fn delete(&self, _path: &str) -> PmxResult<()> {
            unsupported()
        }
        async fn canonical_path(&self, path: &str) -> PmxResult<String> {
            Ok(path.to_string())
        }
        fn parent(&self, _path: &str) -> Option<String> {
            None
        }
        fn is_absolute(&self, _path: &str) -> bool {
            true
        }
        fn name(&self, path: &str) -> String {
            path.to_string()
        }
        async fn move_to(&self, _old: &str, _new: &str) -> PmxResult<()> {
            unsupported()
        }
        async fn list_files(&self, _path: &str) -> PmxResult<Vec<String>> {
            unsupported()
        }
        async fn last_modified(&self, _path: &str) -> PmxResult<i64> {
            unsupported()
        }
        async fn size(&self, _path: &str) -> PmxResult<u64> {
            unsupported()
        }
        async fn is_directory(&self, _path: &str) -> bool {
            false
        }
        async fn open_handle(&self, _path: &str, _mode: AccessMode) -> PmxResult<Box<dyn FileHandle>> {
            unsupported()
        }
        async fn new_input_stream(&self, _path: &str) -> PmxResult<ByteReader> {
            unsupported()
        }
        async fn new_output_stream(&self, _path: &str, _append: bool) -> PmxResult<ByteWriter> {
            unsupported()
        }
        async fn can_write(&self, _path: &str) -> bool {
            false
        }
        async fn is_read_only(&self, _path: &str) -> bool {
            true
        }
        async fn set_read_only(&self, _path: &str) -> bool {
            false
        }
        async fn create_temp_file(&self, _prefix: &str, _suffix: &str, _in_temp_dir: bool) -> PmxResult<String> {
            unsupported()
        }
    }

    fn new_registry() -> ProviderRegistry {
        ProviderRegistry::new(Arc::new(MemoryBackend::with_scheme("default")))
    }

    #[test]
    fn test_unclaimed_path_resolves_to_default() {
        let registry = new_registry();
        registry.register(Arc::new(MemoryBackend::with_scheme("mem")));

        assert_eq!(registry.resolve("/plain/path").scheme(), "default");
        assert_eq!(registry.resolve("other:/x").scheme(), "default");
        assert_eq!(registry.resolve("memory:/x").scheme(), "default");
    }

    #[test]
    fn test_distinct_prefixes_resolve_independently() {
        let registry = new_registry();
        registry.register(Arc::new(MemoryBackend::with_scheme("alpha")));
        registry.register(Arc::new(MemoryBackend::with_scheme("beta")));

        assert_eq!(registry.resolve("alpha:/x").scheme(), "alpha");
        assert_eq!(registry.resolve("beta:/x").scheme(), "beta");

        let swapped = new_registry();
        swapped.register(Arc::new(MemoryBackend::with_scheme("beta")));
        swapped.register(Arc::new(MemoryBackend::with_scheme("alpha")));

        assert_eq!(swapped.resolve("alpha:/x").scheme(), "alpha");
        assert_eq!(swapped.resolve("beta:/x").scheme(), "beta");
    }

    #[test]
    fn test_overlapping_claims_earliest_wins() {
        let registry = new_registry();
        registry.register(PrefixClaim::new("wide", "zip"));
        registry.register(PrefixClaim::new("narrow", "zip:"));
        assert_eq!(registry.resolve("zip:/a").scheme(), "wide");

        let swapped = new_registry();
        swapped.register(PrefixClaim::new("narrow", "zip:"));
        swapped.register(PrefixClaim::new("wide", "zip"));
        assert_eq!(swapped.resolve("zip:/a").scheme(), "narrow");
        assert_eq!(swapped.resolve("zipper").scheme(), "wide");
    }

    #[test]
    fn test_register_replaces_in_place() {
        let registry = new_registry();
        registry.register(PrefixClaim::new("first", "x"));
        registry.register(PrefixClaim::new("second", "x"));
        registry.register(PrefixClaim::new("first", "y"));

        assert_eq!(registry.schemes(), vec!["first", "second"]);
        // replacement keeps priority, but now claims "y" instead of "x"
        assert_eq!(registry.resolve("x1").scheme(), "second");
        assert_eq!(registry.resolve("y1").scheme(), "first");
    }

    #[test]
    fn test_get() {
        let registry = new_registry();
        registry.register(Arc::new(MemoryBackend::with_scheme("mem")));

        assert!(registry.get("mem").is_some());
        assert_eq!(registry.get("default").unwrap().scheme(), "default");
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_snapshot_survives_registration() {
        let registry = new_registry();
        registry.register(Arc::new(MemoryBackend::with_scheme("alpha")));
        let before = registry.snapshot();
        registry.register(Arc::new(MemoryBackend::with_scheme("beta")));

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }
}
