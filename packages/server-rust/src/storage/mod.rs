//! Wine persistence backends for the `Cellar` server.
//!
//! Every backend implements [`WineStore`](crate::traits::WineStore):
//!
//! - [`MemoryWineStore`]: `DashMap`-backed, process-local
//! - [`RedbWineStore`]: embedded redb file (feature `redb`, on by default)
//! - [`PostgresWineStore`]: `PostgreSQL` via `sqlx` (feature `postgres`)
//!
//! [`open_store`] picks one from a [`StorageConfig`].

pub mod factory;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "redb")]
pub mod redb_store;

pub use factory::{open_store, StorageConfig};
pub use memory::MemoryWineStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresWineStore;
#[cfg(feature = "redb")]
pub use redb_store::RedbWineStore;
