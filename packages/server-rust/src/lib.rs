//! `Cellar` Server: a wine catalog served as HTML pages over axum, with
//! in-memory, redb, or `PostgreSQL` storage.

pub mod cli;
pub mod error;
pub mod network;
pub mod render;
pub mod storage;
pub mod telemetry;
pub mod traits;

pub use traits::WineStore;
