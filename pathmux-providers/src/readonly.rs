// SPDX-License-Identifier: AGPL-3.0-or-later
//! Read-only wrapper backend
//!
//! `ro:<inner path>` serves `<inner path>` from the wrapped backend and
//! rejects every mutation.

use async_trait::async_trait;
use pathmux_core::{
    error::{PmxError, PmxResult},
    handle::{ByteReader, ByteWriter, FileHandle},
    operations::AccessMode,
    path, FileBackend,
};
use std::sync::Arc;

/// Default scheme of the read-only wrapper
pub const READ_ONLY_SCHEME: &str = "ro";

/// Backend exposing another backend without write access
pub struct ReadOnlyBackend {
    scheme: String,
    inner: Arc<dyn FileBackend>,
}

impl ReadOnlyBackend {
    pub fn new(inner: Arc<dyn FileBackend>) -> Self {
        Self::with_scheme(READ_ONLY_SCHEME, inner)
    }

    pub fn with_scheme(scheme: impl Into<String>, inner: Arc<dyn FileBackend>) -> Self {
        Self {
            scheme: scheme.into(),
            inner,
        }
    }

    fn inner_path<'a>(&self, path: &'a str) -> &'a str {
        path::strip_scheme(path, &self.scheme).unwrap_or(path)
    }

    fn wrap(&self, inner_path: &str) -> String {
        format!("{}{}{}", self.scheme, path::SCHEME_SEPARATOR, inner_path)
    }

    fn denied<T>(&self, path: &str) -> PmxResult<T> {
        tracing::debug!(path, "write rejected by read-only backend");
        Err(PmxError::PermissionDenied(path.to_string()))
    }
}

#[async_trait]
impl FileBackend for ReadOnlyBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn display_name(&self) -> &str {
        "Read-Only Wrapper"
    }

    async fn exists(&self, path: &str) -> bool {
        self.inner.exists(self.inner_path(path)).await
    }

    async fn create_directory(&self, path: &str) -> PmxResult<()> {
        self.denied(path)
    }

    async fn create_file(&self, path: &str) -> PmxResult<bool> {
        self.denied(path)
    }

    async fn delete(&self, path: &str) -> PmxResult<()> {
        self.denied(path)
    }

    async fn canonical_path(&self, path: &str) -> PmxResult<String> {
        let canonical = self.inner.canonical_path(self.inner_path(path)).await?;
        Ok(self.wrap(&canonical))
    }

    fn parent(&self, path: &str) -> Option<String> {
        self.inner.parent(self.inner_path(path)).map(|p| self.wrap(&p))
    }

    fn is_absolute(&self, path: &str) -> bool {
        self.inner.is_absolute(self.inner_path(path))
    }

    fn name(&self, path: &str) -> String {
        self.inner.name(self.inner_path(path))
    }

    async fn move_to(&self, old_path: &str, _new_path: &str) -> PmxResult<()> {
        self.denied(old_path)
    }

    async fn list_files(&self, path: &str) -> PmxResult<Vec<String>> {
        let children = self.inner.list_files(self.inner_path(path)).await?;
        Ok(children.iter().map(|c| self.wrap(c)).collect())
    }

    async fn last_modified(&self, path: &str) -> PmxResult<i64> {
        self.inner.last_modified(self.inner_path(path)).await
    }

    async fn size(&self, path: &str) -> PmxResult<u64> {
        self.inner.size(self.inner_path(path)).await
    }

    async fn is_directory(&self, path: &str) -> bool {
        self.inner.is_directory(self.inner_path(path)).await
    }

    async fn is_symbolic_link(&self, path: &str) -> bool {
        self.inner.is_symbolic_link(self.inner_path(path)).await
    }

    async fn open_handle(&self, path: &str, mode: AccessMode) -> PmxResult<Box<dyn FileHandle>> {
        if mode.is_writable() {
            return self.denied(path);
        }
        self.inner.open_handle(self.inner_path(path), mode).await
    }

    async fn new_input_stream(&self, path: &str) -> PmxResult<ByteReader> {
        self.inner.new_input_stream(self.inner_path(path)).await
    }

    async fn new_output_stream(&self, path: &str, _append: bool) -> PmxResult<ByteWriter> {
        self.denied(path)
    }

    async fn can_write(&self, _path: &str) -> bool {
        false
    }

    async fn is_read_only(&self, _path: &str) -> bool {
        true
    }

    async fn set_read_only(&self, path: &str) -> bool {
        self.exists(path).await
    }

    async fn create_temp_file(&self, prefix: &str, _suffix: &str, _in_temp_dir: bool) -> PmxResult<String> {
        self.denied(prefix)
    }

    fn unwrap(&self, path: &str) -> String {
        self.inner.unwrap(self.inner_path(path))
    }

    fn file_starts_with(&self, path: &str, prefix: &str) -> bool {
        self.inner
            .file_starts_with(self.inner_path(path), self.inner_path(prefix))
    }
}
