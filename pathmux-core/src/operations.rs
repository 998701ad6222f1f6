//! Operation options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PmxError;

/// Access mode for random-access handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// `r`: read only
    Read,
    /// `rw`: read and write, file created if missing
    ReadWrite,
    /// `rws`: every write also flushes content and metadata
    ReadWriteSync,
    /// `rwd`: every write also flushes content
    ReadWriteDataSync,
}

impl AccessMode {
    pub fn is_writable(&self) -> bool {
        !matches!(self, AccessMode::Read)
    }

    pub fn is_synchronous(&self) -> bool {
        matches!(self, AccessMode::ReadWriteSync | AccessMode::ReadWriteDataSync)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::ReadWrite => "rw",
            AccessMode::ReadWriteSync => "rws",
            AccessMode::ReadWriteDataSync => "rwd",
        }
    }
}

impl FromStr for AccessMode {
    type Err = PmxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(AccessMode::Read),
            "rw" => Ok(AccessMode::ReadWrite),
            "rws" => Ok(AccessMode::ReadWriteSync),
            "rwd" => Ok(AccessMode::ReadWriteDataSync),
            other => Err(PmxError::Unsupported(format!("access mode {other:?}"))),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for temporary file creation
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TempFileOptions {
    /// Remove the file when the owning `FileSystem` cleans up
    pub delete_on_exit: bool,
    /// Place the file in the backend's temporary directory instead of next
    /// to the prefix
    pub in_temp_dir: bool,
}
