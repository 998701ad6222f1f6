//! Storage providers for pathmux
//!
//! Ships the local disk backend (the default for unclaimed paths), an
//! in-memory store and a read-only wrapper, plus the registry that maps a
//! path's scheme to the backend serving it.

pub mod config;
mod local;
mod memory;
mod readonly;
pub mod registry;

pub use config::{MountConfig, MountKind, RegistryConfig};
pub use local::{LocalBackend, LOCAL_SCHEME};
pub use memory::{MemoryBackend, MemoryHandle, MEMORY_SCHEME};
pub use readonly::{ReadOnlyBackend, READ_ONLY_SCHEME};
pub use registry::ProviderRegistry;
