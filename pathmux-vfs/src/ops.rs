//! Composite operations built on the facade
//!
//! These only use public [`FileSystem`] calls, so every step is routed to
//! the backend owning the path it touches.

use futures::future::{BoxFuture, FutureExt};
use pathmux_core::{PmxError, PmxResult};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use crate::FileSystem;

impl FileSystem {
    /// Delete `path` and everything beneath it, children before parents.
    /// Symbolic links are removed without touching what they point to.
    ///
    /// A missing path is a no-op. With `try_only`, failures are swallowed:
    /// an unlistable directory is treated as empty and a failed delete is
    /// skipped.
    pub async fn delete_recursive(&self, path: &str, try_only: bool) -> PmxResult<()> {
        self.delete_tree(path, try_only).await
    }

    fn delete_tree<'a>(&'a self, path: &'a str, try_only: bool) -> BoxFuture<'a, PmxResult<()>> {
        async move {
            if !self.exists(path).await {
                return Ok(());
            }

            if self.is_directory(path).await && !self.is_symbolic_link(path).await {
                let children = match self.list_files(path).await {
                    Ok(children) => children,
                    Err(e) if try_only => {
                        tracing::debug!(path, error = %e, "cannot list directory, skipping children");
                        Vec::new()
                    }
                    Err(e) => return Err(e),
                };
                for child in &children {
                    self.delete_tree(child, try_only).await?;
                }
            }

            if try_only {
                self.try_delete(path).await;
                Ok(())
            } else {
                self.delete(path).await
            }
        }
        .boxed()
    }

    /// Create `dir` and any missing ancestors, topmost first.
    ///
    /// Existing directories are left alone. A backend whose parent chain
    /// loops back onto a visited path yields [`PmxError::MalformedParent`].
    pub async fn create_directories(&self, dir: &str) -> PmxResult<()> {
        let mut missing: Vec<String> = Vec::new();
        let mut current = Some(dir.to_string());

        while let Some(path) = current {
            if self.exists(&path).await {
                break;
            }
            let parent = self.parent(&path);
            if parent.as_deref() == Some(path.as_str()) || missing.contains(&path) {
                return Err(PmxError::MalformedParent(path));
            }
            missing.push(path);
            current = parent;
        }

        for path in missing.iter().rev() {
            tracing::trace!(path = %path, "creating directory");
            self.create_directory(path).await?;
        }
        Ok(())
    }

    /// Copy the bytes of `original` into `copy`, replacing its content.
    /// Returns the number of bytes copied.
    ///
    /// Both streams are released before returning, on success or failure.
    /// Copying a file onto itself, under any alias, is rejected before
    /// either stream is opened.
    pub async fn copy(&self, original: &str, copy: &str) -> PmxResult<u64> {
        if self.same_file(original, copy).await {
            return Err(PmxError::InvalidPath(format!("cannot copy {original} onto itself")));
        }

        let mut input = self.new_input_stream(original).await?;
        let mut output = self.new_output_stream(copy, false).await?;
        let copied = tokio::io::copy(&mut input, &mut output).await?;
        output.shutdown().await?;

        tracing::debug!(original, copy, bytes = copied, "copied file");
        Ok(copied)
    }

    /// Whether two paths name the same file once wrappers are stripped and
    /// both are canonicalized by their backend.
    async fn same_file(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let (a, b) = (self.unwrap(a), self.unwrap(b));
        if !Arc::ptr_eq(&self.backend(&a), &self.backend(&b)) {
            return false;
        }
        match (self.canonical_path(&a).await, self.canonical_path(&b).await) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Delete `path`, reporting success instead of failing.
    pub async fn try_delete(&self, path: &str) -> bool {
        match self.delete(path).await {
            Ok(()) => true,
            Err(e) => {
                tracing::trace!(path, error = %e, "delete attempt failed");
                false
            }
        }
    }
}
