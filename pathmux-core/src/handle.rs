//! Open file handles returned by backends
//!
//! Handles are owned by whoever opened them and are released when dropped.

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite};

/// Sequential reader over a file's content
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Sequential writer into a file
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Random-access file handle
#[async_trait]
pub trait FileHandle: AsyncRead + AsyncWrite + AsyncSeek + Send + Unpin {
    /// Current length of the file in bytes
    async fn len(&mut self) -> io::Result<u64>;

    /// Truncate or extend the file to `len` bytes
    async fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Flush content and metadata to the underlying storage
    async fn sync_all(&mut self) -> io::Result<()>;
}

#[async_trait]
impl FileHandle for tokio::fs::File {
    async fn len(&mut self) -> io::Result<u64> {
        Ok(self.metadata().await?.len())
    }

    async fn set_len(&mut self, len: u64) -> io::Result<()> {
        tokio::fs::File::set_len(self, len).await
    }

    async fn sync_all(&mut self) -> io::Result<()> {
        tokio::fs::File::sync_all(self).await
    }
}
