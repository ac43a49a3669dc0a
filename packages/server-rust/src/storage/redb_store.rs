//! Embedded [`WineStore`] backed by a single redb database file.
//!
//! Records live in the `wines` table keyed by identity, with the mutable
//! fields MsgPack-encoded via `rmp-serde`. The last assigned identity is
//! kept in the `sequences` table and bumped in the same write transaction
//! as the insert, so identities survive restarts and are never reused.
//!
//! redb calls are blocking; every operation runs on the blocking pool.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cellar_core::{Wine, WineFields, WineId};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::info;

use crate::traits::WineStore;

const WINES: TableDefinition<i64, &[u8]> = TableDefinition::new("wines");
const SEQUENCES: TableDefinition<&str, i64> = TableDefinition::new("sequences");
const WINE_SEQUENCE: &str = "wines";

/// redb-backed wine storage.
pub struct RedbWineStore {
    db: Arc<Database>,
}

impl RedbWineStore {
    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is not a redb database.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let db = Database::create(path.as_ref())?;
        info!(path = %path.as_ref().display(), "opened redb wine store");
        Ok(Self { db: Arc::new(db) })
    }

    /// Runs `f` against the database on the blocking thread pool.
    async fn blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

fn encode(fields: &WineFields) -> anyhow::Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(fields)?)
}

fn decode(id: i64, bytes: &[u8]) -> anyhow::Result<Wine> {
    let fields: WineFields = rmp_serde::from_slice(bytes)?;
    Ok(Wine::new(WineId::new(id), fields))
}

#[async_trait]
impl WineStore for RedbWineStore {
    async fn list(&self) -> anyhow::Result<Vec<Wine>> {
        self.blocking(|db| {
            let txn = db.begin_read()?;
            let table = txn.open_table(WINES)?;
            // Keys iterate in ascending order.
            let wines = table
                .iter()?
                .map(|entry| {
                    let (key, value) = entry?;
                    decode(key.value(), value.value())
                })
                .collect::<anyhow::Result<Vec<_>>>();
            wines
        })
        .await
    }

    async fn get(&self, id: WineId) -> anyhow::Result<Option<Wine>> {
        self.blocking(move |db| {
            let txn = db.begin_read()?;
            let table = txn.open_table(WINES)?;
            let found = table.get(id.get())?;
            found.map(|value| decode(id.get(), value.value())).transpose()
        })
        .await
    }

    async fn create(&self, fields: &WineFields) -> anyhow::Result<Wine> {
        let bytes = encode(fields)?;
        let fields = fields.clone();
        self.blocking(move |db| {
            let txn = db.begin_write()?;
            let id = {
                let mut sequences = txn.open_table(SEQUENCES)?;
                let last = sequences.get(WINE_SEQUENCE)?.map_or(0, |v| v.value());
                let next = last + 1;
                sequences.insert(WINE_SEQUENCE, next)?;

                let mut wines = txn.open_table(WINES)?;
                wines.insert(next, bytes.as_slice())?;
                next
            };
            txn.commit()?;
            Ok(Wine::new(WineId::new(id), fields))
        })
        .await
    }

    async fn update(&self, id: WineId, fields: &WineFields) -> anyhow::Result<Option<Wine>> {
        let bytes = encode(fields)?;
        let fields = fields.clone();
        self.blocking(move |db| {
            let txn = db.begin_write()?;
            let existed = {
                let mut wines = txn.open_table(WINES)?;
                let exists = wines.get(id.get())?.is_some();
                if exists {
                    wines.insert(id.get(), bytes.as_slice())?;
                }
                exists
            };
            if !existed {
                txn.abort()?;
                return Ok(None);
            }
            txn.commit()?;
            Ok(Some(Wine::new(id, fields)))
        })
        .await
    }

    async fn delete(&self, id: WineId) -> anyhow::Result<bool> {
        self.blocking(move |db| {
            let txn = db.begin_write()?;
            let removed = {
                let mut wines = txn.open_table(WINES)?;
                // Bind before the block ends so the guard drops ahead of the table.
                let removed = wines.remove(id.get())?.is_some();
                removed
            };
            txn.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn count(&self) -> anyhow::Result<u64> {
        self.blocking(|db| {
            let txn = db.begin_read()?;
            let table = txn.open_table(WINES)?;
            Ok(table.len()?)
        })
        .await
    }

    /// Creates both tables so read transactions never see a missing table.
    async fn initialize(&self) -> anyhow::Result<()> {
        self.blocking(|db| {
            let txn = db.begin_write()?;
            txn.open_table(WINES)?;
            txn.open_table(SEQUENCES)?;
            txn.commit()?;
            Ok(())
        })
        .await
    }

    async fn close(&self) -> anyhow::Result<()> {
        // The file is released when the last `Arc<Database>` drops.
        Ok(())
    }
}
