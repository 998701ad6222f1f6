//! In-memory storage backend
//!
//! Entries live in a flat map keyed by their normalized path. The root
//! directory always exists. Data is lost when the backend is dropped.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use pathmux_core::{
    error::{PmxError, PmxResult},
    handle::{ByteReader, ByteWriter, FileHandle},
    operations::AccessMode,
    path, FileBackend, VirtualPath,
};
use std::collections::BTreeMap;
use std::io::{self, Cursor, SeekFrom};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};

/// Default scheme of the memory backend
pub const MEMORY_SCHEME: &str = "memFS";

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[derive(Debug)]
struct MemFile {
    data: Vec<u8>,
    modified: i64,
    read_only: bool,
}

impl MemFile {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            modified: now_millis(),
            read_only: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Directory { modified: i64 },
    File(Arc<Mutex<MemFile>>),
}

/// In-memory storage backend
pub struct MemoryBackend {
    scheme: String,
    nodes: RwLock<BTreeMap<String, Node>>,
    temp_counter: AtomicU64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_scheme(MEMORY_SCHEME)
    }

    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(String::new(), Node::Directory { modified: now_millis() });
        Self {
            scheme: scheme.into(),
            nodes: RwLock::new(nodes),
            temp_counter: AtomicU64::new(0),
        }
    }

    fn parse(&self, path: &str) -> VirtualPath {
        VirtualPath::new(&self.scheme, path::strip_scheme(path, &self.scheme).unwrap_or(path))
    }

    fn node(&self, vpath: &VirtualPath) -> Option<Node> {
        self.nodes.read().get(&vpath.key()).cloned()
    }

    fn file(&self, path: &str) -> PmxResult<Arc<Mutex<MemFile>>> {
        match self.node(&self.parse(path)) {
            Some(Node::File(file)) => Ok(file),
            Some(Node::Directory { .. }) => Err(PmxError::NotAFile(path.to_string())),
            None => Err(PmxError::NotFound(path.to_string())),
        }
    }

    /// Fetch the file at `path`, creating it when missing.
    fn file_or_create(&self, path: &str) -> PmxResult<Arc<Mutex<MemFile>>> {
        let vpath = self.parse(path);
        let mut nodes = self.nodes.write();
        match nodes.get(&vpath.key()) {
            Some(Node::File(file)) => Ok(file.clone()),
            Some(Node::Directory { .. }) => Err(PmxError::NotAFile(path.to_string())),
            None => {
                check_parent(&nodes, &vpath, path)?;
                let file = Arc::new(Mutex::new(MemFile::empty()));
                nodes.insert(vpath.key(), Node::File(file.clone()));
                Ok(file)
            }
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// The parent of `vpath` must exist and be a directory.
fn check_parent(nodes: &BTreeMap<String, Node>, vpath: &VirtualPath, path: &str) -> PmxResult<()> {
    let Some(parent) = vpath.parent() else {
        return Ok(());
    };
    match nodes.get(&parent.key()) {
        Some(Node::Directory { .. }) => Ok(()),
        Some(Node::File(_)) => Err(PmxError::NotADirectory(parent.to_uri())),
        None => Err(PmxError::NotFound(format!("parent of {path}"))),
    }
}

/// Keys strictly below `key`, in order
fn descendants<'a>(nodes: &'a BTreeMap<String, Node>, key: &str) -> impl Iterator<Item = &'a String> + 'a {
    let prefix = if key.is_empty() {
        String::new()
    } else {
        format!("{key}/")
    };
    nodes
        .range(prefix.clone()..)
        .map(|(k, _)| k)
        .take_while(move |k| k.starts_with(&prefix))
        .filter(|k| !k.is_empty())
}

#[async_trait]
impl FileBackend for MemoryBackend {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn display_name(&self) -> &str {
        "In-Memory Store"
    }

    async fn exists(&self, path: &str) -> bool {
        self.node(&self.parse(path)).is_some()
    }

    async fn create_directory(&self, path: &str) -> PmxResult<()> {
        let vpath = self.parse(path);
        let mut nodes = self.nodes.write();
        match nodes.get(&vpath.key()) {
            Some(Node::Directory { .. }) => Ok(()),
            Some(Node::File(_)) => Err(PmxError::AlreadyExists(path.to_string())),
            None => {
                check_parent(&nodes, &vpath, path)?;
                nodes.insert(vpath.key(), Node::Directory { modified: now_millis() });
                Ok(())
            }
        }
    }

    async fn create_file(&self, path: &str) -> PmxResult<bool> {
        let vpath = self.parse(path);
        let mut nodes = self.nodes.write();
        if nodes.contains_key(&vpath.key()) {
            return Ok(false);
        }
        check_parent(&nodes, &vpath, path)?;
        nodes.insert(vpath.key(), Node::File(Arc::new(Mutex::new(MemFile::empty()))));
        Ok(true)
    }

    async fn delete(&self, path: &str) -> PmxResult<()> {
        let vpath = self.parse(path);
        if vpath.is_root() {
            return Err(PmxError::InvalidPath(format!("cannot delete root {path}")));
        }

        let key = vpath.key();
        let mut nodes = self.nodes.write();
        match nodes.get(&key) {
            None => Err(PmxError::NotFound(path.to_string())),
            Some(Node::Directory { .. }) if descendants(&nodes, &key).next().is_some() => {
                Err(PmxError::NotEmpty(path.to_string()))
            }
            Some(_) => {
                nodes.remove(&key);
                Ok(())
            }
        }
    }

    async fn canonical_path(&self, path: &str) -> PmxResult<String> {
        Ok(self.parse(path).to_uri())
    }

    fn parent(&self, path: &str) -> Option<String> {
        self.parse(path).parent().map(|p| p.to_uri())
    }

    fn is_absolute(&self, _path: &str) -> bool {
        true
    }

    fn name(&self, path: &str) -> String {
        self.parse(path).name().unwrap_or_default().to_string()
    }

    async fn move_to(&self, old_path: &str, new_path: &str) -> PmxResult<()> {
        let src = self.parse(old_path);
        let dst = self.parse(new_path);
        if src == dst {
            return match self.node(&src) {
                Some(_) => Ok(()),
                None => Err(PmxError::NotFound(old_path.to_string())),
            };
        }
        if src.is_root() || dst.starts_with(&src) {
            return Err(PmxError::InvalidPath(format!("cannot move {old_path} into {new_path}")));
        }

        let mut nodes = self.nodes.write();
        let (src_key, dst_key) = (src.key(), dst.key());
        if !nodes.contains_key(&src_key) {
            return Err(PmxError::NotFound(old_path.to_string()));
        }
        if nodes.contains_key(&dst_key) {
            return Err(PmxError::AlreadyExists(new_path.to_string()));
        }
        check_parent(&nodes, &dst, new_path)?;

        let mut moved: Vec<String> = descendants(&nodes, &src_key).cloned().collect();
        moved.push(src_key.clone());
        for key in moved {
            if let Some(node) = nodes.remove(&key) {
                let rekeyed = format!("{}{}", dst_key, &key[src_key.len()..]);
                nodes.insert(rekeyed, node);
            }
        }
        Ok(())
    }

    async fn list_files(&self, path: &str) -> PmxResult<Vec<String>> {
        let vpath = self.parse(path);
        let key = vpath.key();
        let nodes = self.nodes.read();
        match nodes.get(&key) {
            Some(Node::Directory { .. }) => {}
            Some(Node::File(_)) => return Err(PmxError::NotADirectory(path.to_string())),
            None => return Err(PmxError::NotFound(path.to_string())),
        }

        let skip = if key.is_empty() { 0 } else { key.len() + 1 };
        Ok(descendants(&nodes, &key)
            .filter(|k| !k[skip..].contains('/'))
            .map(|k| VirtualPath::new(&self.scheme, k).to_uri())
            .collect())
    }

    async fn last_modified(&self, path: &str) -> PmxResult<i64> {
        match self.node(&self.parse(path)) {
            Some(Node::Directory { modified }) => Ok(modified),
            Some(Node::File(file)) => Ok(file.lock().modified),
            None => Err(PmxError::NotFound(path.to_string())),
        }
    }

    async fn size(&self, path: &str) -> PmxResult<u64> {
        match self.node(&self.parse(path)) {
            Some(Node::Directory { .. }) => Ok(0),
            Some(Node::File(file)) => Ok(file.lock().data.len() as u64),
            None => Err(PmxError::NotFound(path.to_string())),
        }
    }

    async fn is_directory(&self, path: &str) -> bool {
        matches!(self.node(&self.parse(path)), Some(Node::Directory { .. }))
    }

    async fn open_handle(&self, path: &str, mode: AccessMode) -> PmxResult<Box<dyn FileHandle>> {
        let file = if mode.is_writable() {
            let file = self.file_or_create(path)?;
            if file.lock().read_only {
                return Err(PmxError::PermissionDenied(path.to_string()));
            }
            file
        } else {
            self.file(path)?
        };
        Ok(Box::new(MemoryHandle {
            file,
            pos: 0,
            writable: mode.is_writable(),
        }))
    }

    async fn new_input_stream(&self, path: &str) -> PmxResult<ByteReader> {
        let data = self.file(path)?.lock().data.clone();
        Ok(Box::new(Cursor::new(data)))
    }

    async fn new_output_stream(&self, path: &str, append: bool) -> PmxResult<ByteWriter> {
        let file = self.file_or_create(path)?;
        {
            let mut guard = file.lock();
            if guard.read_only {
                return Err(PmxError::PermissionDenied(path.to_string()));
            }
            if !append {
                guard.data.clear();
                guard.modified = now_millis();
            }
        }
        Ok(Box::new(MemoryWriter { file }))
    }

    async fn can_write(&self, path: &str) -> bool {
        match self.node(&self.parse(path)) {
            Some(Node::File(file)) => !file.lock().read_only,
            Some(Node::Directory { .. }) => true,
            None => false,
        }
    }

    async fn is_read_only(&self, path: &str) -> bool {
        match self.node(&self.parse(path)) {
            Some(Node::File(file)) => file.lock().read_only,
            _ => false,
        }
    }

    async fn set_read_only(&self, path: &str) -> bool {
        match self.node(&self.parse(path)) {
            Some(Node::File(file)) => {
                file.lock().read_only = true;
                true
            }
            _ => false,
        }
    }

    /// Names are `<prefix><counter><suffix>`. With `in_temp_dir` the file
    /// goes to the root directory.
    async fn create_temp_file(&self, prefix: &str, suffix: &str, in_temp_dir: bool) -> PmxResult<String> {
        let parsed = self.parse(prefix);
        let base = match (in_temp_dir, parsed.name()) {
            (true, Some(name)) => VirtualPath::root(&self.scheme).join(name),
            _ => parsed.clone(),
        };
        let stem = match base.name() {
            Some(_) => base.to_uri(),
            None => format!("{}tmp", base.to_uri()),
        };

        loop {
            let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{stem}{n}{suffix}");
            if self.create_file(&candidate).await? {
                return Ok(candidate);
            }
        }
    }
}

/// Random-access handle onto an in-memory file
pub struct MemoryHandle {
    file: Arc<Mutex<MemFile>>,
    pos: u64,
    writable: bool,
}

fn write_at(file: &Mutex<MemFile>, pos: u64, buf: &[u8]) -> io::Result<u64> {
    let mut file = file.lock();
    if file.read_only {
        return Err(io::Error::new(io::ErrorKind::PermissionDenied, "file is read-only"));
    }
    let end = pos.checked_add(buf.len() as u64).ok_or_else(too_large)?;
    if (file.data.len() as u64) < end {
        resize(&mut file.data, end)?;
    }
    // end fits in usize once the buffer holds it
    let end = end as usize;
    file.data[end - buf.len()..end].copy_from_slice(buf);
    file.modified = now_millis();
    Ok(end as u64)
}

fn too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "file size out of range")
}

/// Grow or truncate to `len`, failing instead of aborting on huge sizes.
fn resize(data: &mut Vec<u8>, len: u64) -> io::Result<()> {
    let len = usize::try_from(len).map_err(|_| too_large())?;
    if len > data.len() {
        data.try_reserve_exact(len - data.len()).map_err(|_| too_large())?;
    }
    data.resize(len, 0);
    Ok(())
}

impl AsyncRead for MemoryHandle {
    fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let file = this.file.lock();
        let start = (this.pos as usize).min(file.data.len());
        let n = buf.remaining().min(file.data.len() - start);
        buf.put_slice(&file.data[start..start + n]);
        drop(file);
        this.pos += n as u64;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MemoryHandle {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if !this.writable {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "handle opened read-only",
            )));
        }
        Poll::Ready(write_at(&this.file, this.pos, buf).map(|end| {
            this.pos = end;
            buf.len()
        }))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl AsyncSeek for MemoryHandle {
    fn start_seek(self: Pin<&mut Self>, position: SeekFrom) -> io::Result<()> {
        let this = self.get_mut();
        let len = this.file.lock().data.len() as i64;
        let target = match position {
            SeekFrom::Start(offset) => i64::try_from(offset).ok(),
            SeekFrom::End(delta) => len.checked_add(delta),
            SeekFrom::Current(delta) => (this.pos as i64).checked_add(delta),
        };
        match target {
            Some(target) if target >= 0 => {
                this.pos = target as u64;
                Ok(())
            }
            _ => Err(io::Error::new(io::ErrorKind::InvalidInput, "invalid seek position")),
        }
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.pos))
    }
}

#[async_trait]
impl FileHandle for MemoryHandle {
    async fn len(&mut self) -> io::Result<u64> {
        Ok(self.file.lock().data.len() as u64)
    }

    async fn set_len(&mut self, len: u64) -> io::Result<()> {
        if !self.writable {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "handle opened read-only"));
        }
        let mut file = self.file.lock();
        resize(&mut file.data, len)?;
        file.modified = now_millis();
        Ok(())
    }

    async fn sync_all(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sequential writer appending to an in-memory file
struct MemoryWriter {
    file: Arc<Mutex<MemFile>>,
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let end = self.file.lock().data.len() as u64;
        Poll::Ready(write_at(&self.file, end, buf).map(|_| buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

    async fn read_all(backend: &MemoryBackend, path: &str) -> Vec<u8> {
        let mut out = Vec::new();
        let mut input = backend.new_input_stream(path).await.unwrap();
        input.read_to_end(&mut out).await.unwrap();
        out
    }

    async fn write_all(backend: &MemoryBackend, path: &str, data: &[u8], append: bool) {
        let mut out = backend.new_output_stream(path, append).await.unwrap();
        out.write_all(data).await.unwrap();
        out.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_root_always_exists() {
        let backend = MemoryBackend::with_scheme("mem");
        assert!(backend.exists("mem:/").await);
        assert!(backend.exists("mem:").await);
        assert!(backend.is_directory("mem:/").await);
        assert!(backend.list_files("mem:/").await.unwrap().is_empty());
        assert!(matches!(backend.delete("mem:/").await, Err(PmxError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_create_file_requires_parent() {
        let backend = MemoryBackend::with_scheme("mem");

        let err = backend.create_file("mem:/x/y.txt").await.unwrap_err();
        assert!(err.is_not_found());

        backend.create_directory("mem:/x").await.unwrap();
        assert!(backend.create_file("mem:/x/y.txt").await.unwrap());
        assert!(!backend.create_file("mem:/x/y.txt").await.unwrap());
        assert_eq!(backend.list_files("mem:/x").await.unwrap(), vec!["mem:/x/y.txt"]);
    }

    #[tokio::test]
    async fn test_create_directory() {
        let backend = MemoryBackend::with_scheme("mem");

        assert!(backend.create_directory("mem:/a/b").await.unwrap_err().is_not_found());
        backend.create_directory("mem:/a").await.unwrap();
        backend.create_directory("mem:/a").await.unwrap();

        backend.create_file("mem:/f").await.unwrap();
        assert!(matches!(
            backend.create_directory("mem:/f").await,
            Err(PmxError::AlreadyExists(_))
        ));
        assert!(matches!(
            backend.create_directory("mem:/f/sub").await,
            Err(PmxError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MemoryBackend::with_scheme("mem");
        backend.create_directory("mem:/d").await.unwrap();
        backend.create_file("mem:/d/f").await.unwrap();

        assert!(backend.delete("mem:/missing").await.unwrap_err().is_not_found());
        assert!(matches!(backend.delete("mem:/d").await, Err(PmxError::NotEmpty(_))));

        backend.delete("mem:/d/f").await.unwrap();
        backend.delete("mem:/d").await.unwrap();
        assert!(!backend.exists("mem:/d").await);
    }

    #[tokio::test]
    async fn test_list_files_direct_children_only() {
        let backend = MemoryBackend::with_scheme("mem");
        backend.create_directory("mem:/a").await.unwrap();
        backend.create_directory("mem:/a/b").await.unwrap();
        backend.create_file("mem:/a/b/deep").await.unwrap();
        backend.create_file("mem:/a/c").await.unwrap();
        backend.create_file("mem:/ab").await.unwrap();

        assert_eq!(
            backend.list_files("mem:/a").await.unwrap(),
            vec!["mem:/a/b", "mem:/a/c"]
        );
        assert_eq!(
            backend.list_files("mem:/").await.unwrap(),
            vec!["mem:/a", "mem:/ab"]
        );
        assert!(matches!(
            backend.list_files("mem:/ab").await,
            Err(PmxError::NotADirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_move_directory_with_descendants() {
        let backend = MemoryBackend::with_scheme("mem");
        backend.create_directory("mem:/src").await.unwrap();
        backend.create_directory("mem:/src/inner").await.unwrap();
        write_all(&backend, "mem:/src/inner/f", b"data", false).await;

        backend.move_to("mem:/src", "mem:/dst").await.unwrap();

        assert!(!backend.exists("mem:/src").await);
        assert!(!backend.exists("mem:/src/inner/f").await);
        assert_eq!(read_all(&backend, "mem:/dst/inner/f").await, b"data");
    }

    #[tokio::test]
    async fn test_move_errors() {
        let backend = MemoryBackend::with_scheme("mem");
        backend.create_directory("mem:/a").await.unwrap();
        backend.create_file("mem:/b").await.unwrap();

        assert!(backend.move_to("mem:/none", "mem:/x").await.unwrap_err().is_not_found());
        assert!(matches!(
            backend.move_to("mem:/a", "mem:/b").await,
            Err(PmxError::AlreadyExists(_))
        ));
        assert!(matches!(
            backend.move_to("mem:/a", "mem:/a/inside").await,
            Err(PmxError::InvalidPath(_))
        ));
        assert!(backend.move_to("mem:/b", "mem:/no/parent").await.unwrap_err().is_not_found());
        backend.move_to("mem:/a", "mem:/a").await.unwrap();
    }

    #[tokio::test]
    async fn test_streams_truncate_and_append() {
        let backend = MemoryBackend::with_scheme("mem");

        write_all(&backend, "mem:/f", b"hello", false).await;
        write_all(&backend, "mem:/f", b" world", true).await;
        assert_eq!(read_all(&backend, "mem:/f").await, b"hello world");
        assert_eq!(backend.size("mem:/f").await.unwrap(), 11);

        write_all(&backend, "mem:/f", b"x", false).await;
        assert_eq!(read_all(&backend, "mem:/f").await, b"x");

        assert!(backend.new_input_stream("mem:/missing").await.err().unwrap().is_not_found());
        assert!(matches!(
            backend.new_input_stream("mem:/").await.err().unwrap(),
            PmxError::NotAFile(_)
        ));
    }

    #[tokio::test]
    async fn test_random_access_handle() {
        let backend = MemoryBackend::with_scheme("mem");

        let mut handle = backend.open_handle("mem:/r", AccessMode::ReadWrite).await.unwrap();
        handle.write_all(b"0123456789").await.unwrap();
        handle.seek(SeekFrom::Start(2)).await.unwrap();
        handle.write_all(b"ab").await.unwrap();
        handle.seek(SeekFrom::End(-3)).await.unwrap();
        let mut tail = Vec::new();
        handle.read_to_end(&mut tail).await.unwrap();
        assert_eq!(tail, b"789");

        handle.set_len(4).await.unwrap();
        assert_eq!(handle.len().await.unwrap(), 4);
        assert!(handle.seek(SeekFrom::Current(-100)).await.is_err());
        drop(handle);

        assert_eq!(read_all(&backend, "mem:/r").await, b"01ab");

        let mut handle = backend.open_handle("mem:/r", AccessMode::ReadWrite).await.unwrap();
        let err = handle.set_len(u64::MAX).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        handle.seek(SeekFrom::Start(i64::MAX as u64)).await.unwrap();
        assert!(handle.write_all(b"x").await.is_err());
        assert_eq!(handle.len().await.unwrap(), 4);
        drop(handle);

        let mut reader = backend.open_handle("mem:/r", AccessMode::Read).await.unwrap();
        assert!(reader.write_all(b"no").await.is_err());
        assert!(backend
            .open_handle("mem:/missing", AccessMode::Read)
            .await
            .err()
            .unwrap()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_read_only_file() {
        let backend = MemoryBackend::with_scheme("mem");
        write_all(&backend, "mem:/f", b"keep", false).await;

        assert!(backend.can_write("mem:/f").await);
        assert!(backend.set_read_only("mem:/f").await);
        assert!(backend.is_read_only("mem:/f").await);
        assert!(!backend.can_write("mem:/f").await);
        assert!(!backend.set_read_only("mem:/missing").await);

        assert!(matches!(
            backend.new_output_stream("mem:/f", false).await.err().unwrap(),
            PmxError::PermissionDenied(_)
        ));
        assert!(matches!(
            backend.open_handle("mem:/f", AccessMode::ReadWrite).await.err().unwrap(),
            PmxError::PermissionDenied(_)
        ));
        assert_eq!(read_all(&backend, "mem:/f").await, b"keep");
    }

    #[tokio::test]
    async fn test_create_temp_file() {
        let backend = MemoryBackend::with_scheme("mem");
        backend.create_directory("mem:/work").await.unwrap();

        let a = backend.create_temp_file("mem:/work/job", ".tmp", false).await.unwrap();
        let b = backend.create_temp_file("mem:/work/job", ".tmp", false).await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("mem:/work/job") && a.ends_with(".tmp"));
        assert!(backend.exists(&b).await);

        let rooted = backend.create_temp_file("mem:/work/job", ".tmp", true).await.unwrap();
        assert_eq!(backend.parent(&rooted).as_deref(), Some("mem:/"));

        assert!(backend
            .create_temp_file("mem:/nowhere/job", ".tmp", false)
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_path_helpers() {
        let backend = MemoryBackend::with_scheme("mem");
        assert_eq!(backend.parent("mem:/x/y").as_deref(), Some("mem:/x"));
        assert_eq!(backend.parent("mem:/x").as_deref(), Some("mem:/"));
        assert_eq!(backend.parent("mem:/"), None);
        assert_eq!(backend.name("mem:/x/y.txt"), "y.txt");
        assert!(backend.is_absolute("mem:x"));
        assert!(backend.accepts("mem:/x"));
        assert!(!backend.accepts("memFS:/x"));
    }

    #[tokio::test]
    async fn test_canonical_path() {
        let backend = MemoryBackend::with_scheme("mem");
        assert_eq!(backend.canonical_path("mem:a//b/./c").await.unwrap(), "mem:/a/b/c");
    }
}
