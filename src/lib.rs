//! mocklake: in-memory emulator of a hierarchical-namespace object store
//! (container-scoped, slash-delimited paths, distinct file/directory nodes)
//! for local development and testing without a live cloud dependency.

pub mod backend;
pub mod container;
pub mod engine;
pub mod error;
pub mod node;
pub mod registry;
pub mod tree;
pub mod types;

// Re-export
pub use backend::StorageBackend;
pub use container::Container;
pub use engine::MemoryStore;
pub use error::{StoreError, StoreResult};
pub use registry::ContainerRegistry;
pub use types::*;
