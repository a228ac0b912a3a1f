#![forbid(unsafe_code)]

mod memory;
mod sqlite;
mod store;

pub use memory::MemorySnapshotStore;
pub use sqlite::SqliteSnapshotStore;
pub use store::SnapshotStore;
