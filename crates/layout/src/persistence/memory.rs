#![forbid(unsafe_code)]

use super::SnapshotStore;
use crate::domain::Snapshot;
use crate::error::Error;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

struct Entry {
    snapshot: Snapshot,
    active: bool,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    entries: BTreeMap<String, Entry>,
}

/// Process-local store, mostly useful in tests.
#[derive(Default)]
pub struct MemorySnapshotStore {
    inner: Mutex<Inner>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, name: &str) -> Result<Option<Snapshot>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .entries
            .get(name)
            .filter(|entry| entry.active)
            .map(|entry| entry.snapshot.clone()))
    }

    async fn list(&self) -> Result<Vec<Snapshot>, Error> {
        let inner = self.inner.lock();
        let mut snapshots: Vec<Snapshot> = inner
            .entries
            .values()
            .filter(|entry| entry.active)
            .map(|entry| entry.snapshot.clone())
            .collect();
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(snapshots)
    }

    async fn names(&self) -> Result<Vec<String>, Error> {
        let inner = self.inner.lock();
        Ok(inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.active)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<i64, Error> {
        if snapshot.name.is_empty() {
            return Err(Error::EmptyName);
        }
        let mut inner = self.inner.lock();
        let existing = inner
            .entries
            .get(&snapshot.name)
            .and_then(|entry| entry.snapshot.id);
        let id = match existing {
            Some(id) => id,
            None => {
                inner.next_id += 1;
                inner.next_id
            }
        };
        let mut snapshot = snapshot.clone();
        snapshot.id = Some(id);
        inner.entries.insert(
            snapshot.name.clone(),
            Entry {
                snapshot,
                active: true,
            },
        );
        Ok(id)
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        Ok(match inner.entries.get_mut(name) {
            Some(entry) if entry.active => {
                entry.active = false;
                true
            }
            _ => false,
        })
    }

    async fn remove_window(
        &self,
        name: &str,
        app_name: &str,
        window_title: Option<&str>,
    ) -> Result<bool, Error> {
        let mut inner = self.inner.lock();
        Ok(match inner.entries.get_mut(name) {
            Some(entry) if entry.active => entry.snapshot.remove_window(app_name, window_title),
            _ => false,
        })
    }
}
