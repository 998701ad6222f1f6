// SPDX-License-Identifier: AGPL-3.0-or-later
//! Dispatch facade
//!
//! Every call resolves the backend owning its (first) path argument and is
//! forwarded unchanged. Results and failures come back exactly as the
//! backend produced them.

use parking_lot::Mutex;
use pathmux_core::{
    AccessMode, ByteReader, ByteWriter, FileBackend, FileHandle, PmxError, PmxResult,
    TempFileOptions,
};
use pathmux_providers::ProviderRegistry;
use std::sync::Arc;

/// Scheme-routed file API
pub struct FileSystem {
    registry: Arc<ProviderRegistry>,
    delete_on_exit: Mutex<Vec<String>>,
}

impl FileSystem {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            delete_on_exit: Mutex::new(Vec::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Backend serving `path`
    pub fn backend(&self, path: &str) -> Arc<dyn FileBackend> {
        self.registry.resolve(path)
    }

    pub async fn exists(&self, path: &str) -> bool {
        self.backend(path).exists(path).await
    }

    /// Create a directory. All parent directories must already exist.
    pub async fn create_directory(&self, path: &str) -> PmxResult<()> {
        self.backend(path).create_directory(path).await
    }

    /// Create an empty file; `Ok(false)` if it already existed.
    pub async fn create_file(&self, path: &str) -> PmxResult<bool> {
        self.backend(path).create_file(path).await
    }

    /// Delete a file or an empty directory.
    pub async fn delete(&self, path: &str) -> PmxResult<()> {
        self.backend(path).delete(path).await
    }

    pub async fn canonical_path(&self, path: &str) -> PmxResult<String> {
        self.backend(path).canonical_path(path).await
    }

    pub fn parent(&self, path: &str) -> Option<String> {
        self.backend(path).parent(path)
    }

    pub fn is_absolute(&self, path: &str) -> bool {
        self.backend(path).is_absolute(path)
    }

    /// Rename within one backend.
    ///
    /// Fails with [`PmxError::BackendMismatch`] when the two paths belong to
    /// different backends; nothing is touched in that case.
    pub async fn move_to(&self, old_path: &str, new_path: &str) -> PmxResult<()> {
        let source = self.backend(old_path);
        let target = self.backend(new_path);
        if !Arc::ptr_eq(&source, &target) {
            return Err(PmxError::BackendMismatch {
                from: old_path.to_string(),
                to: new_path.to_string(),
            });
        }
        source.move_to(old_path, new_path).await
    }

    pub fn name(&self, path: &str) -> String {
        self.backend(path).name(path)
    }

    /// Fully qualified paths of the entries in `path`
    pub async fn list_files(&self, path: &str) -> PmxResult<Vec<String>> {
        self.backend(path).list_files(path).await
    }

    /// Milliseconds since the Unix epoch
    pub async fn last_modified(&self, path: &str) -> PmxResult<i64> {
        self.backend(path).last_modified(path).await
    }

    pub async fn size(&self, path: &str) -> PmxResult<u64> {
        self.backend(path).size(path).await
    }

    pub async fn is_directory(&self, path: &str) -> bool {
        self.backend(path).is_directory(path).await
    }

    pub async fn is_symbolic_link(&self, path: &str) -> bool {
        self.backend(path).is_symbolic_link(path).await
    }

    pub async fn open_handle(&self, path: &str, mode: AccessMode) -> PmxResult<Box<dyn FileHandle>> {
        self.backend(path).open_handle(path, mode).await
    }

    pub async fn new_input_stream(&self, path: &str) -> PmxResult<ByteReader> {
        self.backend(path).new_input_stream(path).await
    }

    /// Open for writing. Without `append` existing content is truncated.
    pub async fn new_output_stream(&self, path: &str, append: bool) -> PmxResult<ByteWriter> {
        self.backend(path).new_output_stream(path, append).await
    }

    pub async fn can_write(&self, path: &str) -> bool {
        self.backend(path).can_write(path).await
    }

    pub async fn is_read_only(&self, path: &str) -> bool {
        self.backend(path).is_read_only(path).await
    }

    pub async fn set_read_only(&self, path: &str) -> bool {
        self.backend(path).set_read_only(path).await
    }

    /// Innermost real path, with wrapper prefixes removed
    pub fn unwrap(&self, path: &str) -> String {
        self.backend(path).unwrap(path)
    }

    pub fn file_starts_with(&self, path: &str, prefix: &str) -> bool {
        self.backend(path).file_starts_with(path, prefix)
    }

    /// Create a uniquely named empty file. `prefix` may include a directory
    /// and selects the backend.
    pub async fn create_temp_file(&self, prefix: &str, suffix: &str, options: TempFileOptions) -> PmxResult<String> {
        let path = self
            .backend(prefix)
            .create_temp_file(prefix, suffix, options.in_temp_dir)
            .await?;
        if options.delete_on_exit {
            self.delete_on_exit.lock().push(path.clone());
        }
        Ok(path)
    }

    /// Remove temp files created with `delete_on_exit`. Returns how many
    /// were actually deleted.
    pub async fn cleanup(&self) -> usize {
        let pending = std::mem::take(&mut *self.delete_on_exit.lock());
        let mut removed = 0;
        for path in pending {
            if self.try_delete(&path).await {
                removed += 1;
            }
        }
        tracing::debug!(removed, "cleaned up temporary files");
        removed
    }
}
