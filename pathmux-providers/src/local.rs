//! Local filesystem backend

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pathmux_core::{
    error::{PmxError, PmxResult},
    handle::{ByteReader, ByteWriter, FileHandle},
    operations::AccessMode,
    path, FileBackend,
};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::BufReader;

/// Scheme accepted for explicitly local paths (`file:/tmp/x`)
pub const LOCAL_SCHEME: &str = "file";

/// Local filesystem backend
///
/// Serves `file:` paths and, as the default backend, every path no other
/// backend claims.
pub struct LocalBackend {
    scheme: String,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self {
            scheme: LOCAL_SCHEME.to_string(),
        }
    }

    fn to_real_path<'a>(&self, path: &'a str) -> &'a Path {
        Path::new(path::strip_scheme(path, &self.scheme).unwrap_or(path))
    }

    /// Give `real` the same `file:` prefix `original` was written with.
    fn qualify(&self, original: &str, real: &Path) -> String {
        let real = real.to_string_lossy();
        if path::has_scheme(original, &self.scheme) {
            format!("{}{}{}", self.scheme, path::SCHEME_SEPARATOR, real)
        } else {
            real.into_owned()
        }
    }

    async fn metadata(&self, path: &str) -> PmxResult<std::fs::Metadata> {
        fs::metadata(self.to_real_path(path))
            .await
            .map_err(|e| PmxError::from_io(e, path))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Lexically resolve `.` and `..` in an absolute path.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[async_trait]
impl FileBackend for LocalBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn display_name(&self) -> &str {
        "Local Filesystem"
    }

    async fn exists(&self, path: &str) -> bool {
        fs::try_exists(self.to_real_path(path)).await.unwrap_or(false)
    }

    async fn create_directory(&self, path: &str) -> PmxResult<()> {
        let real = self.to_real_path(path);
        match fs::create_dir(real).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if self.is_directory(path).await {
                    Ok(())
                } else {
                    Err(PmxError::AlreadyExists(path.to_string()))
                }
            }
            Err(e) => Err(PmxError::from_io(e, path)),
        }
    }

    async fn create_file(&self, path: &str) -> PmxResult<bool> {
        let created = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.to_real_path(path))
            .await;
        match created {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(PmxError::from_io(e, path)),
        }
    }

    async fn delete(&self, path: &str) -> PmxResult<()> {
        let real = self.to_real_path(path);
        let meta = fs::symlink_metadata(real)
            .await
            .map_err(|e| PmxError::from_io(e, path))?;

        let removed = if meta.is_dir() {
            fs::remove_dir(real).await
        } else {
            fs::remove_file(real).await
        };
        removed.map_err(|e| PmxError::from_io(e, path))
    }

    /// Resolves symlinks when the path exists, otherwise normalizes it
    /// lexically against the working directory. The `file:` prefix is
    /// dropped.
    async fn canonical_path(&self, path: &str) -> PmxResult<String> {
        let real = self.to_real_path(path);
        let canonical = match fs::canonicalize(real).await {
            Ok(canonical) => canonical,
            Err(_) if real.is_absolute() => normalize(real),
            Err(_) => {
                let cwd = std::env::current_dir().map_err(PmxError::Io)?;
                normalize(&cwd.join(real))
            }
        };
        Ok(canonical.to_string_lossy().into_owned())
    }

    fn parent(&self, path: &str) -> Option<String> {
        self.to_real_path(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| self.qualify(path, p))
    }

    fn is_absolute(&self, path: &str) -> bool {
        self.to_real_path(path).is_absolute()
    }

    fn name(&self, path: &str) -> String {
        self.to_real_path(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    async fn move_to(&self, old_path: &str, new_path: &str) -> PmxResult<()> {
        let src = self.to_real_path(old_path);
        let dst = self.to_real_path(new_path);

        if !self.exists(old_path).await {
            return Err(PmxError::NotFound(old_path.to_string()));
        }
        if src == dst {
            return Ok(());
        }
        if self.exists(new_path).await {
            return Err(PmxError::AlreadyExists(new_path.to_string()));
        }

        fs::rename(src, dst)
            .await
            .map_err(|e| PmxError::from_io(e, new_path))
    }

    async fn list_files(&self, path: &str) -> PmxResult<Vec<String>> {
        let real = self.to_real_path(path);
        if !self.is_directory(path).await {
            if self.exists(path).await {
                return Err(PmxError::NotADirectory(path.to_string()));
            }
            return Err(PmxError::NotFound(path.to_string()));
        }

        let mut children = Vec::new();
        let mut read_dir = fs::read_dir(real)
            .await
            .map_err(|e| PmxError::from_io(e, path))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| PmxError::from_io(e, path))?
        {
            children.push(self.qualify(path, &entry.path()));
        }

        children.sort();
        Ok(children)
    }

    async fn last_modified(&self, path: &str) -> PmxResult<i64> {
        let modified = self.metadata(path).await?.modified()?;
        Ok(DateTime::<Utc>::from(modified).timestamp_millis())
    }

    async fn size(&self, path: &str) -> PmxResult<u64> {
        Ok(self.metadata(path).await?.len())
    }

    async fn is_directory(&self, path: &str) -> bool {
        self.metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
    }

    async fn is_symbolic_link(&self, path: &str) -> bool {
        fs::symlink_metadata(self.to_real_path(path))
            .await
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false)
    }

    async fn open_handle(&self, path: &str, mode: AccessMode) -> PmxResult<Box<dyn FileHandle>> {
        let mut options = OpenOptions::new();
        options.read(true);
        if mode.is_writable() {
            options.write(true).create(true);
        }

        #[cfg(unix)]
        match mode {
            AccessMode::ReadWriteSync => {
                options.custom_flags(libc::O_SYNC);
            }
            AccessMode::ReadWriteDataSync => {
                options.custom_flags(libc::O_DSYNC);
            }
            _ => {}
        }

        let file = options
            .open(self.to_real_path(path))
            .await
            .map_err(|e| PmxError::from_io(e, path))?;
        tracing::trace!(path, %mode, "opened local handle");
        Ok(Box::new(file))
    }

    async fn new_input_stream(&self, path: &str) -> PmxResult<ByteReader> {
        let file = fs::File::open(self.to_real_path(path))
            .await
            .map_err(|e| PmxError::from_io(e, path))?;
        Ok(Box::new(BufReader::new(file)))
    }

    async fn new_output_stream(&self, path: &str, append: bool) -> PmxResult<ByteWriter> {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options
            .open(self.to_real_path(path))
            .await
            .map_err(|e| PmxError::from_io(e, path))?;
        Ok(Box::new(file))
    }

    async fn can_write(&self, path: &str) -> bool {
        self.metadata(path)
            .await
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false)
    }

    async fn is_read_only(&self, path: &str) -> bool {
        self.metadata(path)
            .await
            .map(|m| m.permissions().readonly())
            .unwrap_or(false)
    }

    async fn set_read_only(&self, path: &str) -> bool {
        let Ok(meta) = self.metadata(path).await else {
            return false;
        };
        let mut permissions = meta.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(self.to_real_path(path), permissions)
            .await
            .is_ok()
    }

    async fn create_temp_file(&self, prefix: &str, suffix: &str, in_temp_dir: bool) -> PmxResult<String> {
        let real = self.to_real_path(prefix);
        let stem = real
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir = if in_temp_dir {
            std::env::temp_dir()
        } else {
            match real.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => parent.to_path_buf(),
                None => PathBuf::from("."),
            }
        };
        let suffix = suffix.to_string();

        let created = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&stem)
                .suffix(&suffix)
                .tempfile_in(&dir)?
                .keep()
                .map_err(|e| e.error)
        })
        .await
        .map_err(|e| PmxError::Io(io::Error::other(e)))?;

        let (_file, temp_path) = created.map_err(|e| PmxError::from_io(e, prefix))?;
        Ok(self.qualify(prefix, &temp_path))
    }

    fn unwrap(&self, path: &str) -> String {
        self.to_real_path(path).to_string_lossy().into_owned()
    }

    fn file_starts_with(&self, path: &str, prefix: &str) -> bool {
        self.unwrap(path).starts_with(&self.unwrap(prefix))
    }
}
