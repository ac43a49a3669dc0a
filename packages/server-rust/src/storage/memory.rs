//! In-memory [`WineStore`] implementation backed by [`DashMap`].
//!
//! Provides concurrent read/write access without external locking.
//! Suitable for development and tests; all records are lost on exit.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use cellar_core::{Wine, WineFields, WineId};
use dashmap::DashMap;

use crate::traits::WineStore;

/// In-memory wine storage with a monotonic identity sequence.
pub struct MemoryWineStore {
    entries: DashMap<WineId, WineFields>,
    last_id: AtomicI64,
}

impl MemoryWineStore {
    /// Creates a new, empty store whose first record gets identity 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            last_id: AtomicI64::new(0),
        }
    }
}

impl Default for MemoryWineStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WineStore for MemoryWineStore {
    async fn list(&self) -> anyhow::Result<Vec<Wine>> {
        let mut wines: Vec<Wine> = self
            .entries
            .iter()
            .map(|entry| Wine::new(*entry.key(), entry.value().clone()))
            .collect();
        wines.sort_by_key(|w| w.id);
        Ok(wines)
    }

    async fn get(&self, id: WineId) -> anyhow::Result<Option<Wine>> {
        Ok(self
            .entries
            .get(&id)
            .map(|entry| Wine::new(id, entry.value().clone())))
    }

    async fn create(&self, fields: &WineFields) -> anyhow::Result<Wine> {
        let id = WineId::new(self.last_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.entries.insert(id, fields.clone());
        Ok(Wine::new(id, fields.clone()))
    }

    async fn update(&self, id: WineId, fields: &WineFields) -> anyhow::Result<Option<Wine>> {
        Ok(self.entries.get_mut(&id).map(|mut entry| {
            *entry.value_mut() = fields.clone();
            Wine::new(id, fields.clone())
        }))
    }

    async fn delete(&self, id: WineId) -> anyhow::Result<bool> {
        Ok(self.entries.remove(&id).is_some())
    }

    async fn count(&self) -> anyhow::Result<u64> {
        Ok(self.entries.len() as u64)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
