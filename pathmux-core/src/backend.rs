//! Storage backend trait

use async_trait::async_trait;

use crate::{
    error::PmxResult,
    handle::{ByteReader, ByteWriter, FileHandle},
    operations::AccessMode,
    path,
};

/// Capability contract every backend implements.
///
/// Paths handed to a backend are the full strings the caller used, scheme
/// prefix included; paths a backend returns must be fully qualified the same
/// way so that they resolve back to it.
#[async_trait]
pub trait FileBackend: Send + Sync {
    /// Scheme token this backend claims (`"memFS"` for `"memFS:/x"`)
    fn scheme(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Whether this backend owns `path`
    fn accepts(&self, path: &str) -> bool {
        path::has_scheme(path, self.scheme())
    }

    async fn exists(&self, path: &str) -> bool;

    /// Create a directory; its parent must already exist.
    async fn create_directory(&self, path: &str) -> PmxResult<()>;

    /// Create an empty file. Returns `false` if the file already exists.
    async fn create_file(&self, path: &str) -> PmxResult<bool>;

    /// Delete a file or an empty directory.
    async fn delete(&self, path: &str) -> PmxResult<()>;

    async fn canonical_path(&self, path: &str) -> PmxResult<String>;

    fn parent(&self, path: &str) -> Option<String>;

    fn is_absolute(&self, path: &str) -> bool;

    /// Last element of the path
    fn name(&self, path: &str) -> String;

    async fn move_to(&self, old_path: &str, new_path: &str) -> PmxResult<()>;

    /// Fully qualified paths of the directory's children
    async fn list_files(&self, path: &str) -> PmxResult<Vec<String>>;

    /// Modification time in milliseconds since the Unix epoch
    async fn last_modified(&self, path: &str) -> PmxResult<i64>;

    async fn size(&self, path: &str) -> PmxResult<u64>;

    async fn is_directory(&self, path: &str) -> bool;

    /// Whether `path` itself is a symbolic link. Recursive operations treat
    /// links as leaves.
    async fn is_symbolic_link(&self, _path: &str) -> bool {
        false
    }

    async fn open_handle(&self, path: &str, mode: AccessMode) -> PmxResult<Box<dyn FileHandle>>;

    async fn new_input_stream(&self, path: &str) -> PmxResult<ByteReader>;

    /// Open for writing; truncates existing content unless `append` is set.
    async fn new_output_stream(&self, path: &str, append: bool) -> PmxResult<ByteWriter>;

    async fn can_write(&self, path: &str) -> bool;

    async fn is_read_only(&self, path: &str) -> bool;

    async fn set_read_only(&self, path: &str) -> bool;

    /// Create a new, uniquely named empty file and return its path.
    async fn create_temp_file(&self, prefix: &str, suffix: &str, in_temp_dir: bool) -> PmxResult<String>;

    /// Strip wrapper prefixes, yielding the innermost real path
    fn unwrap(&self, path: &str) -> String {
        path.to_string()
    }

    fn file_starts_with(&self, path: &str, prefix: &str) -> bool {
        path.starts_with(prefix)
    }
}
