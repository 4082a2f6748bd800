//! Hardware abstraction traits
//!
//! These traits define the interface between the core logic and the
//! board-specific collaborators it drives.

pub mod storage;

pub use storage::{MemoryStorage, RecordStorage, StorageError};
