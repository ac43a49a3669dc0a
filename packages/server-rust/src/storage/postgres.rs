//! `PostgreSQL` [`WineStore`] over an `sqlx` connection pool.
//!
//! All SQL is runtime-checked (`sqlx::query`, not `sqlx::query!`) so the
//! crate builds without a live database. Column widths mirror the field
//! declarations, so the database rejects over-long values on its own.

use async_trait::async_trait;
use cellar_core::{Wine, WineFields, WineId};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::info;

use crate::traits::WineStore;

const CREATE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS wines (
    id          BIGSERIAL PRIMARY KEY,
    wine_name   VARCHAR(50) NOT NULL,
    price       VARCHAR(10) NOT NULL,
    varietal    VARCHAR(50) NOT NULL,
    description TEXT NOT NULL
)";

const SELECT_COLUMNS: &str = "SELECT id, wine_name, price, varietal, description FROM wines";

/// Postgres-backed wine storage.
pub struct PostgresWineStore {
    pool: PgPool,
}

impl PostgresWineStore {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or rejects the credentials.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        info!(max_connections, "connected postgres wine store");
        Ok(Self::new(pool))
    }
}

fn row_to_wine(row: &PgRow) -> anyhow::Result<Wine> {
    let fields = WineFields::from_trusted_row(
        row.try_get("wine_name")?,
        row.try_get("price")?,
        row.try_get("varietal")?,
        row.try_get("description")?,
    );
    Ok(Wine::new(WineId::new(row.try_get("id")?), fields))
}

#[async_trait]
impl WineStore for PostgresWineStore {
    async fn list(&self) -> anyhow::Result<Vec<Wine>> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_wine).collect()
    }

    async fn get(&self, id: WineId) -> anyhow::Result<Option<Wine>> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_wine).transpose()
    }

    async fn create(&self, fields: &WineFields) -> anyhow::Result<Wine> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO wines (wine_name, price, varietal, description) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(fields.wine_name())
        .bind(fields.price())
        .bind(fields.varietal())
        .bind(fields.description())
        .fetch_one(&self.pool)
        .await?;
        Ok(Wine::new(WineId::new(id), fields.clone()))
    }

    async fn update(&self, id: WineId, fields: &WineFields) -> anyhow::Result<Option<Wine>> {
        let result = sqlx::query(
            "UPDATE wines SET wine_name = $1, price = $2, varietal = $3, description = $4 \
             WHERE id = $5",
        )
        .bind(fields.wine_name())
        .bind(fields.price())
        .bind(fields.varietal())
        .bind(fields.description())
        .bind(id.get())
        .execute(&self.pool)
        .await?;
        Ok((result.rows_affected() > 0).then(|| Wine::new(id, fields.clone())))
    }

    async fn delete(&self, id: WineId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM wines WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wines")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count)?)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        Ok(())
    }
}
