//! Session persistence module
//!
//! The snapshot format and the stores that hold it.

pub mod paths;
pub mod snapshot;
pub mod store;

pub use snapshot::{SessionSnapshot, STATE_KEY};
pub use store::{FileStore, MemoryStore, SnapshotStore};
