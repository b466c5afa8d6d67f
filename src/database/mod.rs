use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, postgres::PgQueryResult, PgPool};
use tracing::info;

use crate::{
    config::DbConfig,
    model::{InsertOutcome, StoreError, StoreResult, WaitlistEntry, WaitlistStore},
};

/// The table is created on first start, the same way a document collection would be.
const CREATE_WAITLIST_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS waitlist_entries (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )
"#;

const MAX_CONNECTIONS: u32 = 5;

/// PostgreSQL backed `WaitlistStore`. Holds a cheaply cloneable pool.
#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    /// Connects to the database, checks the connection and makes sure the table exists.
    pub async fn init(db_config: &DbConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let db_pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_millis(2000))
            .connect_with(db_config.connection_options())
            .await
            .map_err(|er| Error::FailToCreatePool(er.to_string()))?;

        let dm = Self { db: db_pool };
        dm.ensure_schema().await?;
        dm.ping().await?;

        Ok(dm)
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_WAITLIST_TABLE).execute(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl WaitlistStore for DbManager {
    #[tracing::instrument(name = "Inserting waiting list entry", skip_all)]
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> StoreResult<InsertOutcome> {
        let query_result = sqlx::query(
            r#"
            INSERT INTO waitlist_entries (id, email, name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
        "#,
        )
        .bind(entry.id)
        .bind(entry.email)
        .bind(entry.name)
        .bind(entry.created_at)
        .execute(&self.db)
        .await;

        insert_outcome(query_result)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<WaitlistEntry>> {
        let entry = sqlx::query_as::<_, WaitlistEntry>(
            r#"SELECT id, email, name, created_at FROM waitlist_entries WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(entry)
    }

    async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist_entries")
            .fetch_one(&self.db)
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("{:<20} - Closing the DB pool", "close_db");
        self.db.close().await;
    }
}

// ###################################
// ->   HELPERS
// ###################################

/// Reads the result of the conditional insert.
/// No affected rows means `ON CONFLICT` kicked in. A unique violation on `email` is read the same way.
fn insert_outcome(
    query_result: core::result::Result<PgQueryResult, sqlx::Error>,
) -> StoreResult<InsertOutcome> {
    match query_result {
        Ok(res) if res.rows_affected() == 0 => Ok(InsertOutcome::AlreadyPresent),
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(er)) if er.is_unique_violation() => {
            Ok(InsertOutcome::AlreadyPresent)
        }
        Err(er) => Err(StoreError::from(er)),
    }
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
