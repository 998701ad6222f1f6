//! pathmux core
//!
//! Backend trait, handle types, path scheme parsing and the shared error
//! type for the scheme-routed file API.

pub mod backend;
pub mod error;
pub mod handle;
pub mod operations;
pub mod path;

pub use backend::FileBackend;
pub use error::{PmxError, PmxResult};
pub use handle::{ByteReader, ByteWriter, FileHandle};
pub use operations::{AccessMode, TempFileOptions};
pub use path::VirtualPath;
