#![forbid(unsafe_code)]

use crate::domain::Snapshot;
use crate::error::Error;
use async_trait::async_trait;

/// Named snapshot storage. Deletion is a tombstone: a deleted name is
/// invisible to reads and comes back to life when saved again.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Active snapshot called `name`, if any.
    async fn get(&self, name: &str) -> Result<Option<Snapshot>, Error>;

    /// Active snapshots, newest first.
    async fn list(&self) -> Result<Vec<Snapshot>, Error>;

    /// Active snapshot names in alphabetical order.
    async fn names(&self) -> Result<Vec<String>, Error>;

    /// Insert or replace the snapshot with the same name. Returns its id.
    async fn save(&self, snapshot: &Snapshot) -> Result<i64, Error>;

    /// Tombstone `name`. Returns whether an active snapshot was deleted.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Drop the first window entry of `app_name` (with an exact title match
    /// when `window_title` is given) from snapshot `name`.
    async fn remove_window(
        &self,
        name: &str,
        app_name: &str,
        window_title: Option<&str>,
    ) -> Result<bool, Error>;
}
