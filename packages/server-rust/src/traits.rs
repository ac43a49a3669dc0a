use async_trait::async_trait;
use cellar_core::{Wine, WineFields, WineId};

/// Pluggable persistence backend for wine records.
/// Implementations: in-memory (tests, ephemeral), redb (embedded), `PostgreSQL`.
///
/// A store owns the only copy of each record. Identities are assigned by
/// the store on [`create`](WineStore::create) and are never reused.
#[async_trait]
pub trait WineStore: Send + Sync {
    /// Load every record, ordered by ascending identity.
    async fn list(&self) -> anyhow::Result<Vec<Wine>>;

    /// Load a single record by identity.
    async fn get(&self, id: WineId) -> anyhow::Result<Option<Wine>>;

    /// Persist a new record and return it with its assigned identity.
    async fn create(&self, fields: &WineFields) -> anyhow::Result<Wine>;

    /// Replace the mutable fields of an existing record.
    /// Returns `None` if no record has this identity.
    async fn update(&self, id: WineId, fields: &WineFields) -> anyhow::Result<Option<Wine>>;

    /// Delete a record. Returns `false` if no record has this identity.
    async fn delete(&self, id: WineId) -> anyhow::Result<bool>;

    /// Number of stored records.
    async fn count(&self) -> anyhow::Result<u64>;

    /// One-time initialization (e.g., create tables).
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Release resources and close connections.
    async fn close(&self) -> anyhow::Result<()>;
}
